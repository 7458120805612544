//! services/bot/src/telegram/state.rs
//!
//! Defines the application's shared state.

use expense_bot_core::SelectionFlow;
use std::sync::Arc;

/// The shared application state, created once at startup and injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<SelectionFlow>,
}
