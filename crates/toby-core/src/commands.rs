//! Chat commands, expressed against the messaging port.
//!
//! The Telegram adapter turns updates into [`Command`]s and hands them here.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    config::Config,
    domain::{ChatId, WalkerId},
    errors::Error,
    formatting::{
        format_help, format_needs_walk, format_statistics, format_walk_confirmation,
        format_walk_failed, split_message,
    },
    messaging::{port::MessagingPort, types::Command},
    store::EventStore,
    Result,
};

pub struct WalkBot {
    cfg: Arc<Config>,
    store: Arc<EventStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl WalkBot {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<EventStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            store,
            messenger,
        }
    }

    /// Route one command. Returns `false` for commands this bot ignores.
    pub async fn dispatch(&self, cmd: &Command) -> Result<bool> {
        match cmd.name.as_str() {
            "walk" => {
                let Some(sender) = &cmd.sender else {
                    return Err(Error::Send(
                        "walk command arrived without a sender".to_string(),
                    ));
                };
                self.walk(cmd.chat_id, &sender.walker_id, &sender.display_name)
                    .await?;
            }
            "stats" => self.stats().await?,
            "ask" if self.cfg.ask_enabled => self.ask().await?,
            "start" | "help" => self.help(cmd.chat_id).await?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Record a walk and confirm it in the sender's chat.
    ///
    /// If the walk could not be stored the sender gets an error notice instead
    /// and the storage error is returned.
    pub async fn walk(
        &self,
        chat_id: ChatId,
        walker_id: &WalkerId,
        display_name: &str,
    ) -> Result<()> {
        if let Err(e) = self.store.record_walk(walker_id, display_name) {
            error!(walker = %walker_id, "failed to record walk: {e}");
            if let Err(send_e) = self
                .messenger
                .send_text(chat_id, &format_walk_failed(display_name))
                .await
            {
                warn!("failed to send walk failure notice: {send_e}");
            }
            return Err(e);
        }

        info!(walker = %walker_id, name = display_name, "walk recorded");
        self.messenger
            .send_text(chat_id, &format_walk_confirmation(display_name))
            .await
    }

    /// Broadcast walk statistics to the group, split to the messenger's
    /// message limit.
    pub async fn stats(&self) -> Result<()> {
        let rows = self.store.walk_statistics()?;
        let max_len = self.messenger.capabilities().max_message_len;
        for chunk in split_message(&format_statistics(&rows), max_len) {
            self.messenger
                .send_text(self.cfg.broadcast_chat_id, &chunk)
                .await?;
        }
        Ok(())
    }

    /// Broadcast how long it has been since the last walk.
    pub async fn ask(&self) -> Result<()> {
        if !self.cfg.ask_enabled {
            return Err(Error::Config("the ask command is disabled".to_string()));
        }
        let elapsed = self.store.elapsed_hours_since_last_walk()?;
        let message = format_needs_walk(elapsed)?;
        self.messenger
            .send_text(self.cfg.broadcast_chat_id, &message)
            .await
    }

    pub async fn help(&self, chat_id: ChatId) -> Result<()> {
        self.messenger
            .send_text(chat_id, &format_help(self.cfg.ask_enabled))
            .await
    }
}
