use std::io::Write;

use crate::level::{Format, Level};
use crate::record::LogRecord;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";

fn level_color(level: Level) -> &'static str {
    match level {
        Level::Debug => MAGENTA,
        Level::Info => BLUE,
        Level::Warn => YELLOW,
        Level::Error | Level::Fatal => RED,
    }
}

/// Renders records into complete, newline-terminated lines.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    format: Format,
    color: bool,
}

impl Encoder {
    pub fn new(format: Format, color: bool) -> Self {
        // Colour only applies to the console layout.
        Encoder {
            format,
            color: color && format == Format::Text,
        }
    }

    pub fn encode(&self, record: &LogRecord<'_>, buf: &mut Vec<u8>) {
        match self.format {
            Format::Json => encode_json(record, buf),
            Format::Text => self.encode_text(record, buf),
        }
    }

    fn encode_text(&self, record: &LogRecord<'_>, buf: &mut Vec<u8>) {
        let location = record.location();
        // Writes into a Vec never fail.
        if self.color {
            let _ = write!(
                buf,
                "{}\t{}{}{RESET}\t{YELLOW}{}{RESET}\t{}",
                record.timestamp,
                level_color(record.level),
                record.level,
                location,
                record.message
            );
        } else {
            let _ = write!(
                buf,
                "{}\t{}\t{}\t{}",
                record.timestamp, record.level, location, record.message
            );
        }
        if let Some(name) = record.logger {
            let _ = write!(buf, "\t[{name}]");
        }
        if record.has_context() {
            buf.push(b'\t');
            if serde_json::to_writer(&mut *buf, &record.context()).is_err() {
                buf.extend_from_slice(b"{}");
            }
        }
        // The stack trace, if any, travels inside the context object.
        buf.push(b'\n');
    }
}

fn encode_json(record: &LogRecord<'_>, buf: &mut Vec<u8>) {
    let start = buf.len();
    if let Err(e) = serde_json::to_writer(&mut *buf, record) {
        // Keep the line parseable even if a field refused to serialize.
        buf.truncate(start);
        let fallback = serde_json::json!({
            "timestamp": record.timestamp,
            "level": record.level,
            "location": record.location(),
            "msg": record.message,
            "error": format!("record encoding failed: {e}"),
        });
        let _ = serde_json::to_writer(&mut *buf, &fallback);
    }
    buf.push(b'\n');
}
