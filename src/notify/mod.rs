//! Outbound message delivery
//!
//! Delivery failures are logged and dropped; game state never depends on
//! whether a message arrived.

use crate::error::Result;
use crate::types::ChatId;
use async_trait::async_trait;
use std::sync::Arc;

/// Transport that can post a text message to a chat
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

/// Fire-and-forget notifier over an optional sink
#[derive(Clone)]
pub struct Notifier {
    sink: Option<Arc<dyn MessageSink>>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub async fn send(&self, chat_id: ChatId, text: &str) {
        let Some(sink) = &self.sink else {
            tracing::debug!("Notifier disabled, dropping message for chat {}", chat_id);
            return;
        };
        if let Err(e) = sink.send_message(chat_id, text).await {
            tracing::error!("Failed to deliver message to chat {}: {}", chat_id, e);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier").field("enabled", &self.is_enabled()).finish()
    }
}
