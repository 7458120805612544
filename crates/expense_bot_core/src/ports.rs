//! crates/expense_bot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the bot's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the concrete store API and of the system clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DatabaseSchema, ExpenseRecord};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Fetches the current schema of the target collection.
    async fn fetch_schema(&self) -> PortResult<DatabaseSchema>;
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Creates exactly one new record. Never updates an existing one.
    async fn create_record(&self, record: &ExpenseRecord) -> PortResult<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
