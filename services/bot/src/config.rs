//! services/bot/src/config.rs
//!
//! Defines the bot's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub telegram_token: String,
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub notion_api_url: String,
    pub notion_version: String,
    pub notion_timeout: Duration,
    pub log_level: Level,
}

// Credentials stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("notion_database_id", &self.notion_database_id)
            .field("notion_api_url", &self.notion_api_url)
            .field("notion_version", &self.notion_version)
            .field("notion_timeout", &self.notion_timeout)
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| var(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        // --- Load Credentials ---
        let telegram_token = var("TELEGRAM_BOT_TOKEN")
            .or_else(|| var("BOT_TOKEN"))
            .ok_or_else(|| ConfigError::MissingVar("TELEGRAM_BOT_TOKEN".to_string()))?;
        let notion_api_key = required("NOTION_API_KEY")?;
        let notion_database_id = required("NOTION_DB_ID")?;

        // --- Load Notion Settings ---
        let notion_api_url = var("NOTION_API_URL")
            .unwrap_or_else(|| "https://api.notion.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();
        let notion_version = var("NOTION_VERSION").unwrap_or_else(|| "2022-06-28".to_string());

        let timeout_str = var("NOTION_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let notion_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "NOTION_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            telegram_token,
            notion_api_key,
            notion_database_id,
            notion_api_url,
            notion_version,
            notion_timeout,
            log_level,
        })
    }
}
