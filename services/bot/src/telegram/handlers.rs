//! services/bot/src/telegram/handlers.rs
//!
//! Update handlers: commands, free-text entries, and selection button presses.
//! Callback data is decoded into a `Selection` here, once, before it reaches the flow.

use std::sync::Arc;

use expense_bot_core::{Selection, UserId};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::User;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::telegram::keyboard::keyboard;
use crate::telegram::messages::{self, Reply};
use crate::telegram::state::AppState;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    #[command(description = "показать инструкцию.")]
    Start,
    #[command(description = "показать инструкцию.")]
    Help,
    #[command(description = "отменить текущую операцию.")]
    Cancel,
}

/// Builds the dispatcher's handler tree.
pub fn schema() -> UpdateHandler<teloxide::RequestError> {
    let message_handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_text));

    dptree::entry()
        .branch(message_handler)
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

fn user_id(user: &User) -> UserId {
    UserId(user.id.0)
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(msg.chat.id, messages::USAGE).await?;
        }
        Command::Cancel => {
            let dropped = match msg.from.as_ref() {
                Some(user) => state.flow.cancel(user_id(user)).await,
                None => false,
            };
            let text = if dropped {
                messages::CANCELLED
            } else {
                messages::NOTHING_TO_CANCEL
            };
            bot.send_message(msg.chat.id, text).await?;
        }
    }
    Ok(())
}

async fn handle_text(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    let user = user_id(user);
    info!(%user, "Entry received");

    let reply = match state.flow.start(user, text).await {
        Ok(reply) => messages::render_reply(reply),
        Err(e) => {
            warn!(%user, error = %e, "Entry rejected");
            Reply::text(messages::render_error(&e))
        }
    };
    send_reply(&bot, msg.chat.id, reply).await
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    // Always acknowledge so the button stops spinning; a stale query is not fatal.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(error = %e, "Failed to answer callback query");
    }

    let user = user_id(&q.from);
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let reply = match q.data.as_deref().map(Selection::decode) {
        Some(Ok(selection)) => {
            info!(%user, callback = %selection, "Selection received");
            match state.flow.choose(user, selection).await {
                Ok(reply) => messages::render_reply(reply),
                Err(e) => Reply::text(messages::render_error(&e)),
            }
        }
        Some(Err(e)) => {
            warn!(%user, error = %e, "Undecodable callback data");
            Reply::text(messages::UNKNOWN_BUTTON)
        }
        None => {
            warn!(%user, "Callback query without data");
            Reply::text(messages::UNKNOWN_BUTTON)
        }
    };
    send_reply(&bot, chat_id, reply).await
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let request = bot.send_message(chat_id, reply.text);
    if reply.choices.is_empty() {
        request.await?;
    } else {
        request.reply_markup(keyboard(&reply.choices)).await?;
    }
    Ok(())
}
