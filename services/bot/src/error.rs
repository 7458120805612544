//! services/bot/src/error.rs
//!
//! Defines the primary error type for the bot service.

use crate::config::ConfigError;
use expense_bot_core::ports::PortError;

/// The primary error type for the `bot` service.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the Telegram Bot API.
    #[error("Telegram Error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Represents an error while building or using the HTTP client.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
}
