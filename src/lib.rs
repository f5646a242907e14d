//! Structured logging facade.
//!
//! A [`Logger`] gates records by level, attributes them to the calling
//! source location, merges static, error and business fields, and writes
//! one text or JSON line per record to the [`Sink`] it owns.
//! [`global`] keeps one process-wide logger chosen from the deployment
//! environment described by a [`Meta`].
//!
//! ```no_run
//! use toolkit_logger::{global, kv, infof, AppEnv, MetaEnv};
//!
//! let meta = MetaEnv::new().with_service("lemon").with_env(AppEnv::Dev);
//! global::init_logger(&meta)?;
//! infof!("port={}", 8080);
//! global::info_kv("startup", &[kv("version", "1.0.0")]);
//! global::close()?;
//! # Ok::<(), toolkit_logger::LogError>(())
//! ```

mod macros;

pub mod config;
pub mod encode;
pub mod env;
pub mod error;
pub mod global;
pub mod init;
pub mod layer;
pub mod level;
pub mod logger;
pub mod meta;
pub mod noop_sink;
pub mod record;
pub mod sink;

pub use config::LoggerConfig;
pub use env::AppEnv;
pub use error::LogError;
pub use level::{Format, Level};
pub use logger::Logger;
pub use meta::{Meta, MetaEnv};
pub use record::{kv, CallSite, Kv};
pub use sink::{MemorySink, Sink};
