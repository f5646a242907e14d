use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::Location;

use crate::level::Level;

/// Fixed keys of an encoded record.
pub mod keys {
    pub const TIME: &str = "timestamp";
    pub const LEVEL: &str = "level";
    pub const NAME: &str = "logger";
    pub const CALLER: &str = "location";
    pub const FUNCTION: &str = "func";
    pub const MESSAGE: &str = "msg";
    pub const STACKTRACE: &str = "estack";
    pub const ERROR: &str = "error";
    /// Namespace holding business key-values.
    pub const BIZ: &str = "bo";

    pub const RESERVED: [&str; 9] = [
        TIME, LEVEL, NAME, CALLER, FUNCTION, MESSAGE, STACKTRACE, ERROR, BIZ,
    ];
}

/// Rendered in place of a location when the call site is unknown.
pub const UNDEFINED_CALLER: &str = "undefined";

/// Source location a record is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub function: Option<&'static str>,
}

impl CallSite {
    pub fn new(file: &'static str, line: u32) -> Self {
        CallSite {
            file,
            line,
            function: None,
        }
    }

    /// Location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        CallSite::new(loc.file(), loc.line())
    }

    pub fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }

    /// The file path cut down to its parent directory and file name.
    pub fn trimmed_path(&self) -> &'static str {
        let file = self.file;
        let Some(last) = file.rfind(['/', '\\']) else {
            return file;
        };
        match file[..last].rfind(['/', '\\']) {
            Some(prev) => &file[prev + 1..],
            None => file,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trimmed_path(), self.line)
    }
}

/// A business key-value pair, logged under the [`keys::BIZ`] namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Kv {
    key: String,
    value: Value,
}

impl Kv {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Build a [`Kv`]. Values that fail to serialize are logged as a placeholder
/// string instead.
pub fn kv(key: impl Into<String>, value: impl Serialize) -> Kv {
    let value = serde_json::to_value(value)
        .unwrap_or_else(|e| Value::String(format!("<unserializable: {e}>")));
    Kv {
        key: key.into(),
        value,
    }
}

impl From<(String, Value)> for Kv {
    fn from((key, value): (String, Value)) -> Self {
        Kv { key, value }
    }
}

/// One fully assembled log entry, borrowed from the logger and the call.
#[derive(Debug)]
pub struct LogRecord<'a> {
    pub timestamp: String,
    pub level: Level,
    pub logger: Option<&'a str>,
    pub caller: Option<CallSite>,
    pub message: &'a str,
    pub static_fields: &'a BTreeMap<String, String>,
    pub error: Option<String>,
    pub stacktrace: Option<String>,
    pub fields: &'a [Kv],
}

impl LogRecord<'_> {
    pub fn location(&self) -> String {
        match &self.caller {
            Some(site) => site.to_string(),
            None => UNDEFINED_CALLER.to_string(),
        }
    }

    /// Whether the record carries anything besides the fixed header.
    pub fn has_context(&self) -> bool {
        !self.static_fields.is_empty()
            || self.error.is_some()
            || self.stacktrace.is_some()
            || !self.fields.is_empty()
    }

    /// View of the record without the fixed header keys.
    pub fn context(&self) -> Context<'_, '_> {
        Context(self)
    }
}

/// Fields namespaced under [`keys::BIZ`], in call order.
struct Biz<'a>(&'a [Kv]);

impl Serialize for Biz<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

fn serialize_context<M: SerializeMap>(record: &LogRecord<'_>, map: &mut M) -> Result<(), M::Error> {
    for (k, v) in record.static_fields {
        map.serialize_entry(k, v)?;
    }
    if let Some(err) = &record.error {
        map.serialize_entry(keys::ERROR, err)?;
    }
    if let Some(stack) = &record.stacktrace {
        map.serialize_entry(keys::STACKTRACE, stack)?;
    }
    if !record.fields.is_empty() {
        map.serialize_entry(keys::BIZ, &Biz(record.fields))?;
    }
    Ok(())
}

impl Serialize for LogRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(keys::TIME, &self.timestamp)?;
        map.serialize_entry(keys::LEVEL, &self.level)?;
        if let Some(name) = self.logger {
            map.serialize_entry(keys::NAME, name)?;
        }
        map.serialize_entry(keys::CALLER, &self.location())?;
        if let Some(function) = self.caller.and_then(|site| site.function) {
            map.serialize_entry(keys::FUNCTION, function)?;
        }
        map.serialize_entry(keys::MESSAGE, self.message)?;
        serialize_context(self, &mut map)?;
        map.end()
    }
}

/// Static fields, error, stacktrace and business fields of a record.
pub struct Context<'r, 'a>(&'r LogRecord<'a>);

impl Serialize for Context<'_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        serialize_context(self.0, &mut map)?;
        map.end()
    }
}
