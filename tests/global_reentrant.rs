use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use toolkit_logger::{global, Logger, LoggerConfig, MemorySink};

static CLOSED_FROM_DISPLAY: AtomicBool = AtomicBool::new(false);

/// Shuts the global logger down while its message is being formatted.
struct CloseOnDisplay;

impl fmt::Display for CloseOnDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if global::close().is_ok() {
            CLOSED_FROM_DISPLAY.store(true, Ordering::SeqCst);
        }
        f.write_str("closing")
    }
}

#[test]
fn message_formatting_may_close_the_global_logger() {
    let sink = MemorySink::new();
    global::install(Logger::new(sink.clone(), LoggerConfig::default()).unwrap()).unwrap();

    global::infof(format_args!("before"));
    global::infof(format_args!("{}", CloseOnDisplay));

    assert!(CLOSED_FROM_DISPLAY.load(Ordering::SeqCst));
    assert!(!global::is_initialized());
    assert!(sink.is_closed());
    // The message that closed the logger arrives after its sink is gone.
    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("before"));

    global::infof(format_args!("dropped"));
    assert_eq!(sink.lines().len(), 1);
}
