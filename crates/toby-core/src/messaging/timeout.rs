use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    domain::ChatId,
    errors::Error,
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

/// MessagingPort decorator that bounds every outbound call.
///
/// A send that does not finish within `limit` is abandoned and reported as
/// `Error::Send`, which keeps the reminder throttle unmarked.
pub struct TimeoutMessenger {
    inner: Arc<dyn MessagingPort>,
    limit: Duration,
}

impl TimeoutMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl MessagingPort for TimeoutMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        self.inner.capabilities()
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        match tokio::time::timeout(self.limit, self.inner.send_text(chat_id, text)).await {
            Ok(res) => res,
            Err(_) => Err(Error::Send(format!(
                "send to chat {} timed out after {:?}",
                chat_id.0, self.limit
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowMessenger {
        delay: Duration,
    }

    #[async_trait]
    impl MessagingPort for SlowMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                max_message_len: 64,
            }
        }

        async fn send_text(&self, _chat_id: ChatId, _text: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn passes_through_fast_sends() {
        let m = TimeoutMessenger::new(
            Arc::new(SlowMessenger {
                delay: Duration::from_millis(10),
            }),
            Duration::from_secs(1),
        );
        m.send_text(ChatId(7), "hi").await.unwrap();
        assert_eq!(m.capabilities().max_message_len, 64);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sends_become_send_errors() {
        let m = TimeoutMessenger::new(
            Arc::new(SlowMessenger {
                delay: Duration::from_secs(30),
            }),
            Duration::from_secs(1),
        );
        let err = m.send_text(ChatId(7), "hi").await.unwrap_err();
        assert!(matches!(err, Error::Send(_)));
    }
}
