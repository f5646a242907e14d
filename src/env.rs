//! Deployment environment classification plus the environment variable
//! names read by [`MetaEnv::from_env`](crate::meta::MetaEnv::from_env).

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Deployment environment selector, e.g. `dev` or `prod`.
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Service name reported in every file record.
pub const APP_SERVICE_ENV: &str = "APP_SERVICE";

/// Business platform the service belongs to.
pub const APP_PLATFORM_ENV: &str = "APP_PLATFORM";

pub const APP_VERSION_ENV: &str = "APP_VERSION";

/// Directory that receives the `log` file outside development.
pub const APP_LOG_PATH_ENV: &str = "APP_LOG_PATH";

/// Optional fixed instance id; a random one is generated otherwise.
pub const APP_ID_ENV: &str = "APP_ID";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Where the application runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEnv {
    Dev,
    Test,
    Pre,
    Prod,
}

impl AppEnv {
    /// Short name used in deployment descriptors (`dp` for production).
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Dev => "dev",
            AppEnv::Test => "test",
            AppEnv::Pre => "pre",
            AppEnv::Prod => "dp",
        }
    }

    pub fn prod_name(&self) -> &'static str {
        match self {
            AppEnv::Prod => "prod",
            other => other.as_str(),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, AppEnv::Dev)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppEnv {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(AppEnv::Dev),
            "test" | "testing" => Ok(AppEnv::Test),
            "pre" | "staging" | "uat" => Ok(AppEnv::Pre),
            "dp" | "prod" | "production" => Ok(AppEnv::Prod),
            _ => Err(LogError::InvalidEnv(s.to_string())),
        }
    }
}
