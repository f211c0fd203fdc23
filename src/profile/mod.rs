//! Player profiles
//!
//! In-memory only; profiles live as long as the process.

mod store;

pub use store::ProfileStore;

use crate::progression::{levels, AchievementId, DailyChallenge};
use crate::round::RoundRecord;
use crate::types::{ChatId, PowerUp, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: UserId,
    pub display_name: String,
    /// 1..=10
    pub level: u8,
    pub xp: u64,
    /// Shard Token balance
    pub tokens: u64,
    pub streak: u32,
    pub best_streak: u32,
    pub total_predictions: u32,
    pub wins: u32,
    pub achievements: BTreeSet<AchievementId>,
    pub power_ups: BTreeMap<PowerUp, u32>,
    /// Among the first players of the chat it was created in
    pub og: bool,
    pub origin_chat: ChatId,
    pub daily_challenge: Option<DailyChallenge>,
    pub created_at: DateTime<Utc>,
    pub last_played: Option<DateTime<Utc>>,
    pub last_airdrop: Option<DateTime<Utc>>,
    /// Newest first
    pub history: VecDeque<RoundRecord>,
}

impl PlayerProfile {
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        origin_chat: ChatId,
        starting_tokens: u64,
        og: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            level: 1,
            xp: 0,
            tokens: starting_tokens,
            streak: 0,
            best_streak: 0,
            total_predictions: 0,
            wins: 0,
            achievements: BTreeSet::new(),
            power_ups: BTreeMap::new(),
            og,
            origin_chat,
            daily_challenge: None,
            created_at: now,
            last_played: None,
            last_airdrop: None,
            history: VecDeque::new(),
        }
    }

    pub fn power_up_count(&self, kind: PowerUp) -> u32 {
        self.power_ups.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_power_up(&mut self, kind: PowerUp) {
        *self.power_ups.entry(kind).or_insert(0) += 1;
    }

    /// Consume one power-up if owned
    pub fn take_power_up(&mut self, kind: PowerUp) -> bool {
        match self.power_ups.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn win_rate(&self) -> Decimal {
        if self.total_predictions == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) * Decimal::ONE_HUNDRED / Decimal::from(self.total_predictions)
    }

    pub fn xp_to_next_level(&self) -> Option<u64> {
        levels::xp_to_next(self.level, self.xp)
    }

    pub fn push_history(&mut self, record: RoundRecord, cap: usize) {
        self.history.push_front(record);
        self.history.truncate(cap.max(1));
    }
}
