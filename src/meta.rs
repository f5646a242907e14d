use std::path::{Path, PathBuf};

use crate::env::{
    env_or, AppEnv, APP_ENV_ENV, APP_ID_ENV, APP_LOG_PATH_ENV, APP_PLATFORM_ENV,
    APP_SERVICE_ENV, APP_VERSION_ENV,
};
use crate::error::LogError;

pub const DEFAULT_PLATFORM: &str = "test";
pub const DEFAULT_SERVICE: &str = "test";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_LOG_PATH: &str = "/tmp/logs/";

/// Application metadata the logger is configured from.
pub trait Meta: Send + Sync {
    /// Business line the service belongs to.
    fn platform(&self) -> &str;
    fn service(&self) -> &str;
    fn env(&self) -> AppEnv;
    fn version(&self) -> &str;
    /// Directory holding the `log` file when not in development.
    fn log_path(&self) -> &Path;
    /// Identifier of this running instance.
    fn id(&self) -> &str;
}

/// Plain [`Meta`] implementation.
#[derive(Debug, Clone)]
pub struct MetaEnv {
    platform: String,
    service: String,
    env: AppEnv,
    version: String,
    log_path: PathBuf,
    id: String,
}

impl Default for MetaEnv {
    fn default() -> Self {
        Self {
            platform: DEFAULT_PLATFORM.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            env: AppEnv::Dev,
            version: DEFAULT_VERSION.to_string(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl MetaEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata from the `APP_*` environment variables, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self, LogError> {
        let defaults = Self::default();
        let env = match std::env::var(APP_ENV_ENV) {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.env,
        };
        Ok(Self {
            platform: env_or(APP_PLATFORM_ENV, &defaults.platform),
            service: env_or(APP_SERVICE_ENV, &defaults.service),
            env,
            version: env_or(APP_VERSION_ENV, &defaults.version),
            log_path: PathBuf::from(env_or(APP_LOG_PATH_ENV, DEFAULT_LOG_PATH)),
            id: env_or(APP_ID_ENV, &defaults.id),
        })
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_env(mut self, env: AppEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_log_path(mut self, log_path: impl Into<PathBuf>) -> Self {
        self.log_path = log_path.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Meta for MetaEnv {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn service(&self) -> &str {
        &self.service
    }

    fn env(&self) -> AppEnv {
        self.env
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn log_path(&self) -> &Path {
        &self.log_path
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let meta = MetaEnv::new();
        assert_eq!(meta.platform(), "test");
        assert_eq!(meta.service(), "test");
        assert_eq!(meta.env(), AppEnv::Dev);
        assert_eq!(meta.version(), "1.0.0");
        assert_eq!(meta.log_path(), Path::new("/tmp/logs/"));
        assert!(uuid::Uuid::parse_str(meta.id()).is_ok());
    }

    #[test]
    fn ids_are_unique_per_instance() {
        assert_ne!(MetaEnv::new().id(), MetaEnv::new().id());
    }

    #[test]
    fn setters_override() {
        let meta = MetaEnv::new()
            .with_service("lemon")
            .with_platform("fruit")
            .with_env(AppEnv::Prod)
            .with_log_path("/var/log/lemon")
            .with_id("fixed");
        assert_eq!(meta.service(), "lemon");
        assert_eq!(meta.platform(), "fruit");
        assert_eq!(meta.env(), AppEnv::Prod);
        assert_eq!(meta.log_path(), Path::new("/var/log/lemon"));
        assert_eq!(meta.id(), "fixed");
    }
}
