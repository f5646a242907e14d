use chrono::{Local, Utc};
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use crate::config::LoggerConfig;
use crate::encode::Encoder;
use crate::error::LogError;
use crate::level::{Format, Level};
use crate::meta::Meta;
use crate::record::{CallSite, Kv, LogRecord};
use crate::sink::{self, Sink};

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Level-gated structured logger bound to a single [`Sink`].
///
/// All methods take `&self`; share a logger between threads with an `Arc`.
/// Each record is encoded into its own buffer and written in one piece while
/// the sink lock is held, so concurrent records never interleave.
pub struct Logger {
    config: LoggerConfig,
    encoder: Encoder,
    sink: Mutex<Option<Box<dyn Sink>>>,
    /// Diagnostics about the logger itself, and diverted text-mode errors.
    error_output: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("closed", &lock(&self.sink).is_none())
            .finish_non_exhaustive()
    }
}

macro_rules! level_methods {
    ($level:expr, $f:ident, $kv:ident, $err:ident) => {
        #[doc = concat!("Log a formatted message at `", stringify!($f), "` level.")]
        #[track_caller]
        pub fn $f(&self, args: fmt::Arguments<'_>) {
            self.log_fmt_at($level, Some(CallSite::caller()), args);
        }

        #[doc = concat!("Log a message with business fields, see [`Logger::", stringify!($f), "`].")]
        #[track_caller]
        pub fn $kv(&self, msg: &str, fields: &[Kv]) {
            self.log_at($level, Some(CallSite::caller()), msg, None, fields);
        }

        #[doc = concat!("Log a message with an attached error, see [`Logger::", stringify!($f), "`].")]
        #[track_caller]
        pub fn $err(&self, msg: &str, err: &dyn Error, fields: &[Kv]) {
            self.log_at($level, Some(CallSite::caller()), msg, Some(err), fields);
        }
    };
}

impl Logger {
    /// Bind a logger to `sink`. No I/O happens here.
    ///
    /// **Returns**
    /// - `Err(LogError::InvalidConfig)` if the timestamp layout is not a
    ///   valid strftime pattern or a static field uses a reserved key.
    pub fn new(sink: impl Sink, config: LoggerConfig) -> Result<Self, LogError> {
        config.validate()?;
        Ok(Self {
            encoder: Encoder::new(config.format, config.color),
            config,
            sink: Mutex::new(Some(Box::new(sink))),
            error_output: Mutex::new(Box::new(io::stderr())),
        })
    }

    /// Replace the stream used for diagnostics (stderr by default).
    pub fn with_error_output(self, out: impl Write + Send + 'static) -> Self {
        Self {
            error_output: Mutex::new(Box::new(out)),
            ..self
        }
    }

    /// Build a logger following the deployment policy for `meta.env()`.
    ///
    /// Development logs coloured text to stdout. Every other environment
    /// appends JSON to `<log_path>/log`, creating the directory if needed,
    /// and stamps each record with `service` and `platform`.
    pub fn from_meta(meta: &dyn Meta) -> Result<Self, LogError> {
        Self::from_meta_with_console(meta, io::stdout())
    }

    /// Same as [`Logger::from_meta`] with `console` standing in for stdout.
    pub fn from_meta_with_console(meta: &dyn Meta, console: impl Sink) -> Result<Self, LogError> {
        let config = LoggerConfig::for_env(meta.env());
        if meta.env().is_development() {
            return Self::new(console, config);
        }

        let file = sink::open_log_file(meta.log_path())?;
        let config = config
            .with_field("platform", meta.platform())
            .with_field("service", meta.service());
        Self::new(file, config)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.level
    }

    level_methods!(Level::Debug, debugf, debug_kv, debug_err);
    level_methods!(Level::Info, infof, info_kv, info_err);
    level_methods!(Level::Warn, warnf, warn_kv, warn_err);
    level_methods!(Level::Error, errorf, error_kv, error_err);
    level_methods!(Level::Fatal, fatalf, fatal_kv, fatal_err);

    /// Format-and-log with an explicit call site. The message is only
    /// formatted when `level` is enabled.
    pub fn log_fmt_at(&self, level: Level, site: Option<CallSite>, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let name = self.config.name.as_deref();
        match args.as_str() {
            Some(msg) => self.emit(level, name, site, msg, None, &[]),
            None => self.emit(level, name, site, &args.to_string(), None, &[]),
        }
    }

    /// Log with an explicit call site. `None` marks the caller as undefined.
    pub fn log_at(
        &self,
        level: Level,
        site: Option<CallSite>,
        msg: &str,
        err: Option<&dyn Error>,
        fields: &[Kv],
    ) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, self.config.name.as_deref(), site, msg, err, fields);
    }

    /// Like [`Logger::log_at`], reporting `name` instead of the configured
    /// logger name. Used when forwarding events that carry their own target.
    pub fn log_as(
        &self,
        name: &str,
        level: Level,
        site: Option<CallSite>,
        msg: &str,
        fields: &[Kv],
    ) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, Some(name), site, msg, None, fields);
    }

    fn emit(
        &self,
        level: Level,
        name: Option<&str>,
        site: Option<CallSite>,
        msg: &str,
        err: Option<&dyn Error>,
        fields: &[Kv],
    ) {
        if site.is_none() {
            self.diagnose(format_args!(
                "{} Logger.check error: failed to get caller",
                Utc::now()
            ));
        }

        let divert = self.config.divert_text_errors
            && self.config.stack_on_error
            && self.config.format == Format::Text;
        let (error, stacktrace) = match err {
            Some(_) if divert => (None, None),
            Some(e) => (
                Some(e.to_string()),
                self.config
                    .stack_on_error
                    .then(|| Backtrace::force_capture().to_string()),
            ),
            None => (None, None),
        };

        let record = LogRecord {
            timestamp: Local::now()
                .format(&self.config.timestamp_layout)
                .to_string(),
            level,
            logger: name,
            caller: site,
            message: msg,
            static_fields: &self.config.static_fields,
            error,
            stacktrace,
            fields,
        };
        self.write(&record);

        if let (true, Some(e)) = (divert, err) {
            self.diagnose(format_args!("{e}"));
        }
    }

    fn write(&self, record: &LogRecord<'_>) {
        let mut buf = Vec::with_capacity(256);
        self.encoder.encode(record, &mut buf);

        let result = match lock(&self.sink).as_mut() {
            Some(sink) => sink.write_all(&buf).and_then(|_| sink.flush()),
            // Closed: the record is dropped.
            None => Ok(()),
        };
        if let Err(e) = result {
            self.diagnose(format_args!(
                "{} Logger.write error: {e}",
                Utc::now()
            ));
        }
    }

    /// Best-effort line on the error output; failures are ignored.
    fn diagnose(&self, line: fmt::Arguments<'_>) {
        let mut out = lock(&self.error_output);
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }

    /// Close the owned sink.
    ///
    /// **Returns**
    /// - `Err(LogError::Sink)` carrying the sink's own close error.
    /// - `Err(LogError::AlreadyClosed)` on every call after the first.
    ///
    /// Records logged after closing are dropped.
    pub fn close(&self) -> Result<(), LogError> {
        let sink = lock(&self.sink).take();
        match sink {
            Some(mut sink) => sink.close().map_err(LogError::Sink),
            None => Err(LogError::AlreadyClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::kv;
    use crate::sink::MemorySink;
    use serde_json::Value;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    fn logger(config: LoggerConfig) -> (Logger, MemorySink, MemorySink) {
        let sink = MemorySink::new();
        let errors = MemorySink::new();
        let logger = Logger::new(sink.clone(), config)
            .unwrap()
            .with_error_output(errors.clone());
        (logger, sink, errors)
    }

    fn json_config(level: Level) -> LoggerConfig {
        LoggerConfig {
            level,
            format: Format::Json,
            ..LoggerConfig::default()
        }
    }

    fn parse(line: &str) -> serde_json::Map<String, Value> {
        match serde_json::from_str(line).unwrap() {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    /// Keys appear as top-level entries, in this order.
    fn assert_key_order(line: &str, keys: &[&str]) {
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| {
                line.find(&format!("\"{k}\":"))
                    .unwrap_or_else(|| panic!("missing {k} in {line}"))
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{line}");
    }

    #[test]
    fn gates_by_minimum_level() {
        for (i, min) in Level::ALL.iter().enumerate() {
            for (j, level) in Level::ALL.iter().enumerate() {
                let (logger, sink, _) = logger(json_config(*min));
                logger.log_at(*level, Some(CallSite::caller()), "x", None, &[]);
                assert_eq!(sink.lines().len(), usize::from(j >= i), "min={min} level={level}");
            }
        }
    }

    #[test]
    fn disabled_calls_skip_formatting() {
        struct Loud;
        impl fmt::Display for Loud {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a disabled record");
            }
        }
        let (logger, sink, _) = logger(json_config(Level::Error));
        logger.infof(format_args!("{}", Loud));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn formats_message_and_attributes_caller() {
        let (logger, sink, errors) = logger(json_config(Level::Debug));
        logger.infof(format_args!("port={}", 111));
        let line = line!() - 1;
        let record = parse(&sink.lines()[0]);
        assert_eq!(record["msg"], "port=111");
        assert_eq!(record["level"], "info");
        assert_eq!(record["location"], format!("src/logger.rs:{line}"));
        assert!(errors.contents().is_empty());
    }

    #[test]
    fn json_record_has_fixed_keys_and_namespace() {
        let (logger, sink, _) = logger(json_config(Level::Debug));
        logger.warn_kv("startup", &[kv("version", "1.0.0"), kv("workers", 4)]);
        let line = &sink.lines()[0];
        assert_key_order(line, &["timestamp", "level", "location", "msg", "bo"]);
        let record = parse(line);
        assert_eq!(record.len(), 5);
        assert_eq!(record["bo"]["version"], "1.0.0");
        assert_eq!(record["bo"]["workers"], 4);
    }

    #[test]
    fn logger_name_is_emitted_when_set() {
        let (logger, sink, _) = logger(LoggerConfig {
            name: Some("billing".into()),
            ..json_config(Level::Debug)
        });
        logger.debugf(format_args!("hi"));
        assert_eq!(parse(&sink.lines()[0])["logger"], "billing");
    }

    #[test]
    fn json_error_carries_text_and_stack() {
        let (logger, sink, _) = logger(json_config(Level::Debug));
        logger.error_err("dial failed", &Refused, &[kv("host", "db")]);
        let line = &sink.lines()[0];
        assert_key_order(
            line,
            &["timestamp", "level", "location", "msg", "error", "estack", "bo"],
        );
        let record = parse(line);
        assert_eq!(record.len(), 7);
        assert_eq!(record["error"], "connection refused");
    }

    #[test]
    fn error_without_stack() {
        let (logger, sink, _) = logger(LoggerConfig {
            stack_on_error: false,
            ..json_config(Level::Debug)
        });
        logger.error_err("dial failed", &Refused, &[]);
        let record = parse(&sink.lines()[0]);
        assert_eq!(record["error"], "connection refused");
        assert!(!record.contains_key("estack"));
    }

    #[test]
    fn text_error_stays_in_record_by_default() {
        let (logger, sink, errors) = logger(LoggerConfig {
            stack_on_error: false,
            ..LoggerConfig::default()
        });
        logger.info_err("dial failed", &Refused, &[]);
        assert!(sink.contents().contains(r#""error":"connection refused""#));
        assert!(errors.contents().is_empty());
    }

    #[test]
    fn text_error_with_stack_is_one_line() {
        let (logger, sink, errors) = logger(LoggerConfig::default());
        logger.info_err("dial failed", &Refused, &[]);
        let contents = sink.contents();
        assert_eq!(sink.lines().len(), 1, "{contents}");
        assert_eq!(contents.matches("\"estack\"").count(), 1, "{contents}");
        assert!(errors.contents().is_empty());
    }

    #[test]
    fn diverted_text_error_goes_to_fallback_stream() {
        let (logger, sink, errors) = logger(LoggerConfig {
            divert_text_errors: true,
            ..LoggerConfig::default()
        });
        logger.info_err("dial failed", &Refused, &[kv("attempt", 3)]);
        let out = sink.contents();
        assert!(out.contains("dial failed"));
        assert!(out.contains(r#"{"bo":{"attempt":3}}"#));
        assert!(!out.contains("connection refused"));
        assert_eq!(errors.contents(), "connection refused\n");
    }

    #[test]
    fn diversion_needs_stack_enabled() {
        let (logger, sink, errors) = logger(LoggerConfig {
            divert_text_errors: true,
            stack_on_error: false,
            ..LoggerConfig::default()
        });
        logger.info_err("dial failed", &Refused, &[]);
        assert!(sink.contents().contains("connection refused"));
        assert!(errors.contents().is_empty());
    }

    #[test]
    fn static_fields_merge_into_every_record() {
        let (logger, sink, _) = logger(json_config(Level::Debug).with_field("service", "lemon"));
        logger.infof(format_args!("a"));
        logger.info_kv("b", &[kv("k", "v")]);
        for line in sink.lines() {
            assert_eq!(parse(&line)["service"], "lemon");
        }
    }

    #[test]
    fn undefined_caller_is_flagged_and_reported() {
        let (logger, sink, errors) = logger(json_config(Level::Debug));
        logger.log_at(Level::Info, None, "orphan", None, &[]);
        assert_eq!(parse(&sink.lines()[0])["location"], "undefined");
        assert!(errors.contents().contains("Logger.check error: failed to get caller"));
    }

    #[test]
    fn broken_error_output_is_ignored() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone(), json_config(Level::Debug))
            .unwrap()
            .with_error_output(Broken);
        logger.log_at(Level::Info, None, "still written", None, &[]);
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn failed_write_is_reported_and_dropped() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        impl Sink for Full {}

        let errors = MemorySink::new();
        let logger = Logger::new(Full, json_config(Level::Debug))
            .unwrap()
            .with_error_output(errors.clone());
        logger.infof(format_args!("lost"));
        logger.warnf(format_args!("also lost"));
        let report = errors.contents();
        assert_eq!(report.matches("Logger.write error").count(), 2, "{report}");
        assert!(report.contains("disk full"), "{report}");
        assert!(!report.contains("lost"), "{report}");
    }

    #[test]
    fn close_once_then_already_closed() {
        let (logger, sink, _) = logger(json_config(Level::Debug));
        logger.close().unwrap();
        assert!(sink.is_closed());
        assert!(matches!(logger.close(), Err(LogError::AlreadyClosed)));
        logger.infof(format_args!("after close"));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn close_propagates_sink_error() {
        let sink = MemorySink::failing_close();
        let logger = Logger::new(sink, LoggerConfig::default()).unwrap();
        assert!(matches!(logger.close(), Err(LogError::Sink(_))));
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = LoggerConfig::default().with_field("level", "x");
        assert!(Logger::new(MemorySink::new(), cfg).is_err());
    }
}
