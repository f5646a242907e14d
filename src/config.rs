use chrono::format::{Item, StrftimeItems};
use std::collections::BTreeMap;

use crate::env::AppEnv;
use crate::error::LogError;
use crate::level::{Format, Level};
use crate::record::keys;

pub const DEFAULT_TIMESTAMP_LAYOUT: &str = "%Y/%m/%d %H:%M:%S";

/// Configuration of a single [`Logger`](crate::Logger).
///
/// **Fields**
/// - `level`: records below this level are skipped before any work is done.
/// - `format`: text (console) or JSON lines.
/// - `color`: ANSI colours for level and location; text format only.
/// - `stack_on_error`: attach a captured stack trace when an error is logged.
/// - `divert_text_errors`: in text format with `stack_on_error`, print the
///   error on the fallback stream instead of the record. Off by default.
/// - `timestamp_layout`: chrono strftime layout, rendered in local time.
/// - `name`: optional logger name, emitted under `logger`.
/// - `static_fields`: string fields merged into every record.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub stack_on_error: bool,
    pub divert_text_errors: bool,
    pub timestamp_layout: String,
    pub name: Option<String>,
    pub static_fields: BTreeMap<String, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::Debug,
            format: Format::Text,
            color: false,
            stack_on_error: true,
            divert_text_errors: false,
            timestamp_layout: DEFAULT_TIMESTAMP_LAYOUT.to_string(),
            name: None,
            static_fields: BTreeMap::new(),
        }
    }
}

impl LoggerConfig {
    /// Deployment policy: coloured debug console output in development,
    /// JSON at info and above everywhere else.
    pub fn for_env(env: AppEnv) -> Self {
        if env.is_development() {
            Self {
                level: Level::Debug,
                format: Format::Text,
                color: true,
                stack_on_error: false,
                ..Self::default()
            }
        } else {
            Self {
                level: Level::Info,
                format: Format::Json,
                color: false,
                ..Self::default()
            }
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_fields.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), LogError> {
        if StrftimeItems::new(&self.timestamp_layout).any(|item| matches!(item, Item::Error)) {
            return Err(LogError::InvalidConfig(format!(
                "bad timestamp layout {:?}",
                self.timestamp_layout
            )));
        }
        if let Some(key) = self
            .static_fields
            .keys()
            .find(|k| keys::RESERVED.contains(&k.as_str()))
        {
            return Err(LogError::InvalidConfig(format!(
                "static field {key:?} shadows a reserved key"
            )));
        }
        Ok(())
    }
}
