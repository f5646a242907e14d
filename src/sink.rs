use std::fs::{self, File, OpenOptions};
use std::io::{self, Stderr, Stdout, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::LogError;

/// Name of the file created inside the configured log directory.
pub const LOG_FILE_NAME: &str = "log";

/// Destination for encoded log lines.
///
/// A sink is owned by exactly one [`Logger`](crate::Logger), which writes
/// each record with a single `write_all` while holding its own lock, so
/// implementations only need sequential append semantics.
pub trait Sink: Write + Send + 'static {
    /// Release the destination.
    ///
    /// **Returns**
    /// - `Ok(())` once buffered data reached the underlying resource.
    /// - `Err(..)` if flushing or closing failed; the logger hands this back
    ///   from [`Logger::close`](crate::Logger::close).
    ///
    /// Called at most once. The default implementation flushes.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for File {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl Sink for Stdout {}

impl Sink for Stderr {}

impl Sink for Box<dyn Sink> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Open `<dir>/log` for appending, creating `dir` and the file as needed.
pub fn open_log_file(dir: &Path) -> Result<File, LogError> {
    fs::create_dir_all(dir).map_err(|e| LogError::io(dir, e))?;
    let path = dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| LogError::io(path, e))
}

/// In-memory sink sharing its buffer between clones.
///
/// Handy for tests and for inspecting what a logger produced.
#[derive(Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
    fail_close: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `close` reports an error.
    pub fn failing_close() -> Self {
        Self {
            fail_close: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for MemorySink {
    fn close(&mut self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "memory sink refused to close"));
        }
        Ok(())
    }
}
