//! Telegram update handlers.
//!
//! Turns a message into a core [`Command`] and lets `WalkBot` do the rest.
//! Reply failures are logged and dropped; users can simply repeat a command.

use std::sync::Arc;

use teloxide::{prelude::*, types::User};
use tracing::{debug, warn};

use toby_core::{
    domain::{ChatId, WalkerId},
    messaging::types::{Command, Sender},
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let sender = msg.from().map(sender_of);
    let Some(cmd) = Command::parse(ChatId(msg.chat.id.0), sender, text) else {
        return Ok(());
    };

    match state.walk_bot.dispatch(&cmd).await {
        Ok(true) => debug!(command = %cmd.name, chat = cmd.chat_id.0, "command handled"),
        Ok(false) => debug!(command = %cmd.name, "ignoring unknown command"),
        Err(e) => warn!(command = %cmd.name, chat = cmd.chat_id.0, "command failed: {e}"),
    }

    Ok(())
}

fn sender_of(user: &User) -> Sender {
    Sender {
        walker_id: WalkerId(user.id.0.to_string()),
        display_name: user.first_name.clone(),
    }
}
