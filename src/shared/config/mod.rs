//! Application configuration module
//!
//! Provides the configuration types for the offline form queue. Values can be
//! built in code through [`AppConfigBuilder`] or parsed from a TOML document:
//!
//! ```toml
//! api_url = "https://jsonplaceholder.typicode.com/posts"
//! database_path = "/var/lib/forms/forms.db"
//! request_timeout_secs = 15
//! auto_sync = true
//! log_filter = "offline_forms=debug"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public test endpoint used when nothing is configured
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default request timeout for the HTTP gateway
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Submission endpoint
    pub api_url: String,
    /// Location of the SQLite queue; `None` picks the platform data directory
    pub database_path: Option<PathBuf>,
    /// Transport timeout for a single submission
    pub request_timeout_secs: u64,
    /// Resync queued submissions automatically when connectivity returns
    pub auto_sync: bool,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            database_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            auto_sync: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("api_url"));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::MissingValue("request_timeout_secs"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_url: Option<String>,
    database_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    auto_sync: Option<bool>,
    log_filter: Option<String>,
}

impl AppConfigBuilder {
    /// Set the submission endpoint
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set the SQLite database file
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Enable or disable automatic resync on reconnect
    pub fn auto_sync(mut self, enabled: bool) -> Self {
        self.auto_sync = Some(enabled);
        self
    }

    /// Set the tracing filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            database_path: self.database_path.or(defaults.database_path),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            auto_sync: self.auto_sync.unwrap_or(defaults.auto_sync),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid configuration file: {0}")]
    Parse(String),
    #[error("could not read configuration: {0}")]
    Io(String),
}
