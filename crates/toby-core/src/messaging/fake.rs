//! Recording messenger for unit tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::ChatId,
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

pub(crate) struct FakeMessenger {
    sends: Mutex<Vec<(ChatId, String)>>,
    failing: AtomicBool,
    max_message_len: usize,
}

impl FakeMessenger {
    pub(crate) fn new() -> Self {
        Self::with_max_len(4096)
    }

    pub(crate) fn with_max_len(max_message_len: usize) -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            max_message_len,
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<(ChatId, String)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: self.max_message_len,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Send("network unreachable".to_string()));
        }
        if text.chars().count() > self.max_message_len {
            return Err(Error::Send("message is too long".to_string()));
        }
        self.sends.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
