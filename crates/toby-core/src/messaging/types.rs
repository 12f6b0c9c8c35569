use crate::domain::{ChatId, WalkerId};

/// Inbound command as seen by the core, after the adapter has stripped
/// transport details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub chat_id: ChatId,
    pub sender: Option<Sender>,
    pub name: String,
}

/// Identity of whoever sent a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub walker_id: WalkerId,
    pub display_name: String,
}

impl Command {
    /// Parse `/cmd@botname ...` into a lowercase command name. Anything after
    /// the command word is ignored.
    ///
    /// Returns `None` for text that is not a command.
    pub fn parse(chat_id: ChatId, sender: Option<Sender>, text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let first = text.split(char::is_whitespace).next().unwrap_or("");
        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            chat_id,
            sender,
            name,
        })
    }
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}
