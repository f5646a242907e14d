use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::Level;
use crate::logger::Logger;
use crate::record::{CallSite, Kv};

/// `tracing_subscriber` layer that forwards events into a [`Logger`].
///
/// The event's `message` becomes the record message, every other field is
/// logged under the business namespace in recording order, the event
/// target is reported as the logger name and file/line as the location.
/// Level gating is the logger's own.
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = Vec::new();
        let mut message = None;
        event.record(&mut FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        });

        let site = meta.file().map(|file| {
            let site = CallSite::new(file, meta.line().unwrap_or(0));
            match meta.module_path() {
                Some(module) => site.with_function(module),
                None => site,
            }
        });
        self.logger.log_as(
            meta.target(),
            level,
            site,
            message.as_deref().unwrap_or_default(),
            &fields,
        );
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Kv>,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields.push(Kv::from((field.name().to_string(), value)));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::String(format!("{:?}", value)));
        }
    }
}
