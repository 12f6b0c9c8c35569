use async_trait::async_trait;

use crate::{
    domain::ChatId,
    messaging::types::MessagingCapabilities,
    Result,
};

/// Outbound messaging port.
///
/// The core only ever sends plain text; failures must surface as
/// `Error::Send` so callers can decide whether to retry.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send one message. Callers keep `text` within
    /// `capabilities().max_message_len`.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
