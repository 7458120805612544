//! services/bot/src/bin/bot.rs

use bot_lib::{
    adapters::{NotionAdapter, SystemClock},
    config::Config,
    error::BotError,
    telegram::{schema, AppState, Command},
};
use expense_bot_core::{OptionCatalog, SelectionFlow};
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), BotError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(?config, "Configuration loaded. Starting bot...");

    // --- 2. Initialize the Notion Adapter ---
    let notion = Arc::new(NotionAdapter::new(&config)?);

    // --- 3. Load the Option Catalog (fatal on failure) ---
    info!("Loading option catalog from Notion...");
    let catalog = Arc::new(OptionCatalog::load(notion.as_ref()).await?);

    // --- 4. Build the Shared AppState ---
    let flow = Arc::new(SelectionFlow::new(catalog, notion, Arc::new(SystemClock)));
    let app_state = Arc::new(AppState { flow });

    // --- 5. Start the Telegram Dispatcher ---
    let bot = Bot::new(config.telegram_token.clone());
    bot.set_my_commands(Command::bot_commands()).await?;

    info!("Bot started");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![app_state])
        .default_handler(|update| async move {
            debug!(kind = ?update.kind, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
