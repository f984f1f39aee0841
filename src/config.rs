//! Configuration loading from TOML files.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Error, Result};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Marketplace backend connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the marketplace REST backend.
    pub base_url: String,
    /// Bearer token attached to every request, if set.
    pub auth_token: Option<String>,
    /// Authenticated user id; supplied by the identity provider in embedded
    /// use, from config for the CLI.
    pub user_id: Option<String>,
}

/// Synchronization loop tuning.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Poll cadence for the active trade, in milliseconds.
    pub poll_interval_ms: u64,
    /// Consecutive reconciliation failures before escalating once.
    pub failure_threshold: u32,
}

impl SyncConfig {
    /// Poll cadence as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 6_000,
            failure_threshold: 3,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.fxpeer.io".into(),
            auth_token: None,
            user_id: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(Error::Config(ConfigError::MissingField {
                field: "api.base_url",
            }));
        }
        url::Url::parse(&self.api.base_url).map_err(|e| {
            Error::Config(ConfigError::InvalidValue {
                field: "api.base_url",
                reason: e.to_string(),
            })
        })?;
        if self.sync.poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "sync.poll_interval_ms",
                reason: "must be positive".into(),
            }));
        }
        if self.sync.failure_threshold == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "sync.failure_threshold",
                reason: "must be at least 1".into(),
            }));
        }
        Ok(())
    }

    /// Initialize logging from the embedded logging section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
