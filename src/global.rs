//! Process-wide logger handle.
//!
//! The handle moves `Uninitialized -> Initialized -> Closed`, one way.
//! [`init_logger`] (or [`install`]) performs the first transition, [`close`]
//! the second. [`logger`] hands out the installed `Arc<Logger>` for code
//! that prefers to receive its logger explicitly; the free functions below
//! and the `*f!` macros are thin wrappers over it.
//!
//! Calling a forwarding function before initialization is a programming
//! error and panics. After [`close`] the forwarded records are dropped.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::LogError;
use crate::level::Level;
use crate::logger::Logger;
use crate::meta::Meta;
use crate::record::{CallSite, Kv};

enum State {
    Uninitialized,
    Initialized(Arc<Logger>),
    Closed,
}

static STATE: RwLock<State> = RwLock::new(State::Uninitialized);

/// Build the logger for `meta.env()` and make it the process-wide logger.
///
/// **Returns**
/// - the installed handle on success.
/// - `Err(LogError::AlreadyInitialized)` unless this is the first call.
/// - `Err(LogError::Io)` if the log directory or file can't be created;
///   the caller decides whether that aborts startup.
pub fn init_logger(meta: &dyn Meta) -> Result<Arc<Logger>, LogError> {
    let logger = {
        let mut state = STATE.write().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, State::Uninitialized) {
            return Err(LogError::AlreadyInitialized);
        }
        let logger = Arc::new(Logger::from_meta(meta)?);
        *state = State::Initialized(Arc::clone(&logger));
        logger
    };
    tracing::debug!(
        env = %meta.env(),
        service = meta.service(),
        platform = meta.platform(),
        "global logger initialized"
    );
    Ok(logger)
}

/// Install an already built logger as the process-wide logger.
pub fn install(logger: Logger) -> Result<Arc<Logger>, LogError> {
    let mut state = STATE.write().unwrap_or_else(PoisonError::into_inner);
    if !matches!(*state, State::Uninitialized) {
        return Err(LogError::AlreadyInitialized);
    }
    let logger = Arc::new(logger);
    *state = State::Initialized(Arc::clone(&logger));
    Ok(logger)
}

/// Close the process-wide logger and its sink.
pub fn close() -> Result<(), LogError> {
    let logger = {
        let mut state = STATE.write().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *state, State::Closed) {
            State::Initialized(logger) => logger,
            State::Uninitialized => {
                *state = State::Uninitialized;
                return Err(LogError::NotInitialized);
            }
            State::Closed => return Err(LogError::AlreadyClosed),
        }
    };
    tracing::debug!("closing global logger");
    logger.close()
}

pub fn is_initialized() -> bool {
    matches!(
        *STATE.read().unwrap_or_else(PoisonError::into_inner),
        State::Initialized(_)
    )
}

/// The installed logger, if any.
pub fn logger() -> Option<Arc<Logger>> {
    match &*STATE.read().unwrap_or_else(PoisonError::into_inner) {
        State::Initialized(logger) => Some(Arc::clone(logger)),
        _ => None,
    }
}

// The read lock is released before `f` runs, so a message whose formatting
// calls back into this module can't deadlock against a writer.
fn with_logger(f: impl FnOnce(&Logger)) {
    let logger = match &*STATE.read().unwrap_or_else(PoisonError::into_inner) {
        State::Initialized(logger) => Arc::clone(logger),
        State::Closed => return,
        State::Uninitialized => panic!("global logger used before init_logger"),
    };
    f(&logger);
}

/// Forward a formatted message attributed to `site`.
///
/// # Panics
///
/// If the global logger was never initialized.
pub fn log_fmt(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    with_logger(|logger| logger.log_fmt_at(level, Some(site), args));
}

/// Forward a message with optional error and business fields.
///
/// # Panics
///
/// If the global logger was never initialized.
pub fn log(level: Level, site: CallSite, msg: &str, err: Option<&dyn Error>, fields: &[Kv]) {
    with_logger(|logger| logger.log_at(level, Some(site), msg, err, fields));
}

macro_rules! forward {
    ($level:expr, $f:ident, $kv:ident, $err:ident) => {
        #[track_caller]
        pub fn $f(args: fmt::Arguments<'_>) {
            log_fmt($level, CallSite::caller(), args);
        }

        #[track_caller]
        pub fn $kv(msg: &str, fields: &[Kv]) {
            log($level, CallSite::caller(), msg, None, fields);
        }

        #[track_caller]
        pub fn $err(msg: &str, err: &dyn Error, fields: &[Kv]) {
            log($level, CallSite::caller(), msg, Some(err), fields);
        }
    };
}

forward!(Level::Debug, debugf, debug_kv, debug_err);
forward!(Level::Info, infof, info_kv, info_err);
forward!(Level::Warn, warnf, warn_kv, warn_err);
forward!(Level::Error, errorf, error_kv, error_err);
forward!(Level::Fatal, fatalf, fatal_kv, fatal_err);
