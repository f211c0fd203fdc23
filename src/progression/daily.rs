//! Daily challenges
//!
//! One challenge per player per rolling 24 hours. The template is picked
//! deterministically from the player id and the day it was assigned.

use crate::profile::PlayerProfile;
use crate::round::{RoundRecord, RoundStatus};
use crate::types::UserId;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Reach a win streak
    StreakTarget,
    /// Make N predictions
    PredictionCount,
    /// Play N rounds in Whale Mode
    WhaleCount,
    /// Win N rounds without a loss in between
    PerfectDay,
}

/// (kind, target, reward)
const TEMPLATES: [(ChallengeKind, u32, u64); 4] = [
    (ChallengeKind::StreakTarget, 3, 200),
    (ChallengeKind::PredictionCount, 5, 150),
    (ChallengeKind::WhaleCount, 1, 250),
    (ChallengeKind::PerfectDay, 3, 300),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub kind: ChallengeKind,
    pub target: u32,
    pub progress: u32,
    pub completed: bool,
    pub reward: u64,
    pub assigned_at: DateTime<Utc>,
}

impl DailyChallenge {
    pub fn generate(user_id: UserId, now: DateTime<Utc>) -> Self {
        let day = now.timestamp().div_euclid(86_400) as u64;
        let mut rng = StdRng::seed_from_u64((user_id as u64).rotate_left(17) ^ day);
        let (kind, target, reward) = TEMPLATES[rng.random_range(0..TEMPLATES.len())];
        Self::new(kind, target, reward, now)
    }

    pub fn new(kind: ChallengeKind, target: u32, reward: u64, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            target,
            progress: 0,
            completed: false,
            reward,
            assigned_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.assigned_at >= Duration::hours(24)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.assigned_at + Duration::hours(24)
    }

    /// Fold a settled round in. Returns true when this call completes it.
    pub fn advance(&mut self, profile: &PlayerProfile, record: &RoundRecord) -> bool {
        if self.completed || record.status == RoundStatus::Failed {
            return false;
        }

        match self.kind {
            ChallengeKind::StreakTarget => {
                self.progress = self.progress.max(profile.streak).min(self.target);
            }
            ChallengeKind::PredictionCount => self.progress += 1,
            ChallengeKind::WhaleCount => {
                if record.whale_mode {
                    self.progress += 1;
                }
            }
            ChallengeKind::PerfectDay => {
                if record.is_win() {
                    self.progress += 1;
                } else {
                    self.progress = 0;
                }
            }
        }

        if self.progress >= self.target {
            self.progress = self.target;
            self.completed = true;
            return true;
        }
        false
    }

    pub fn description(&self) -> String {
        match self.kind {
            ChallengeKind::StreakTarget => format!("Reach a {} win streak", self.target),
            ChallengeKind::PredictionCount => format!("Make {} predictions", self.target),
            ChallengeKind::WhaleCount => format!("Play {} round(s) in Whale Mode", self.target),
            ChallengeKind::PerfectDay => format!("Win {} rounds without a loss", self.target),
        }
    }
}
