use std::io;
use std::path::PathBuf;

/// Error type returned by logger construction, initialization and shutdown.
///
/// Per-record failures never surface here: a record that cannot be written
/// is dropped so that logging can't take the host application down.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to prepare log destination {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to close log sink: {0}")]
    Sink(#[source] io::Error),

    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown application environment: {0:?}")]
    InvalidEnv(String),

    #[error("logger is already closed")]
    AlreadyClosed,

    #[error("global logger is already initialized")]
    AlreadyInitialized,

    #[error("global logger is not initialized")]
    NotInitialized,

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

impl LogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Io {
            path: path.into(),
            source,
        }
    }
}
