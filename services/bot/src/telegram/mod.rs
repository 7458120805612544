pub mod handlers;
pub mod keyboard;
pub mod messages;
pub mod state;

// Re-export the handler tree so the binary can build the dispatcher from it.
pub use handlers::{schema, Command};
pub use state::AppState;
