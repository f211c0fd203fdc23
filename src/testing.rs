//! Test doubles shared across module tests

use crate::config::GameConfig;
use crate::error::{BotError, Result};
use crate::notify::{MessageSink, Notifier};
use crate::types::ChatId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Sink that keeps every message it is given
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(ChatId, String)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sink whose every delivery errors
    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, ..Default::default() })
    }

    pub fn messages(&self) -> Vec<(ChatId, String)> {
        self.messages.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|(_, t)| t.contains(needle))
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<()> {
        if self.fail {
            return Err(BotError::Telegram("sendMessage: 502 Bad Gateway".to_string()));
        }
        self.messages.lock().push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn notifier_for(sink: &Arc<RecordingSink>) -> Notifier {
    Notifier::new(sink.clone())
}

/// Game rules with cooldowns off and a round long enough that timers never
/// fire during a test
pub fn test_game_config() -> GameConfig {
    GameConfig {
        cooldown_free_secs: 0,
        cooldown_pro_secs: 0,
        round_secs: 3600,
        ..Default::default()
    }
}
