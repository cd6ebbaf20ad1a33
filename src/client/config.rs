use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use std::path::PathBuf;

/// Directory created under the platform data dir
const DATA_DIR_NAME: &str = "offline-forms";

/// Database file name inside [`DATA_DIR_NAME`]
const DATABASE_FILE: &str = "forms.db";

/// Client configuration: [`AppConfig`] plus environment overrides.
///
/// Recognised variables:
/// - `CLIENT_API_URL` - submission endpoint
/// - `OFFLINE_FORMS_DB` - SQLite file path
/// - `OFFLINE_FORMS_AUTO_SYNC` - `1`/`true` to resync on reconnect
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: apply_env(AppConfig::default()),
        }
    }
}

impl Config {
    /// Create a new configuration from defaults and the environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        let app = builder.build()?;
        Ok(Self { app })
    }

    /// Load a TOML file, then apply environment overrides
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let app = apply_env(AppConfig::load(path.into())?);
        app.validate()?;
        Ok(Self { app })
    }

    /// Wrap an already-built configuration without consulting the environment
    pub fn from_app(app: AppConfig) -> Result<Self, ConfigError> {
        app.validate()?;
        Ok(Self { app })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Submission endpoint
    pub fn api_url(&self) -> &str {
        &self.app.api_url
    }

    /// Path of the SQLite queue, falling back to the platform data directory
    pub fn database_path(&self) -> PathBuf {
        self.app
            .database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.app.request_timeout_secs)
    }

    pub fn auto_sync(&self) -> bool {
        self.app.auto_sync
    }

    pub fn log_filter(&self) -> &str {
        &self.app.log_filter
    }
}

fn apply_env(mut app: AppConfig) -> AppConfig {
    if let Ok(url) = std::env::var("CLIENT_API_URL") {
        app.api_url = url;
    }
    if let Ok(path) = std::env::var("OFFLINE_FORMS_DB") {
        app.database_path = Some(PathBuf::from(path));
    }
    if let Ok(flag) = std::env::var("OFFLINE_FORMS_AUTO_SYNC") {
        app.auto_sync = matches!(flag.trim(), "1" | "true" | "yes");
    }
    app
}

/// Platform-specific location of the queue database
fn default_database_path() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push(DATA_DIR_NAME);
    path.push(DATABASE_FILE);
    path
}
