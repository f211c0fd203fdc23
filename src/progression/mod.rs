//! Progression & achievement rules engine
//!
//! Pure evaluation over an owned profile snapshot. Called once per settled
//! round, after stats and rewards have been folded into the profile.
//!
//! ```text
//! settled profile + round record ─→ levels ─→ achievements ─→ daily challenge
//!                                      │           │                │
//!                                  level_ups    unlocked     challenge_completed
//! ```

pub mod achievements;
pub mod daily;
pub mod levels;

pub use achievements::{Achievement, AchievementId, ACHIEVEMENTS};
pub use daily::{ChallengeKind, DailyChallenge};
pub use levels::{level_for_xp, LEVEL_THRESHOLDS, MAX_LEVEL};

use crate::profile::PlayerProfile;
use crate::round::RoundRecord;
use chrono::{DateTime, Utc};

/// Result of evaluating the rules after a round
#[derive(Debug, Clone)]
pub struct Progression {
    pub profile: PlayerProfile,
    pub unlocked: Vec<&'static Achievement>,
    /// Each level entered, in order
    pub level_ups: Vec<u8>,
    pub challenge_completed: Option<DailyChallenge>,
}

impl Progression {
    pub fn bonus_tokens(&self) -> u64 {
        let achievements: u64 = self.unlocked.iter().map(|a| a.reward).sum();
        achievements + self.challenge_completed.as_ref().map_or(0, |c| c.reward)
    }
}

/// Evaluate leveling, achievements and the daily challenge.
pub fn evaluate(profile: &PlayerProfile, latest: &RoundRecord, now: DateTime<Utc>) -> Progression {
    let mut next = profile.clone();

    let level_ups = levels::climb(next.level, next.xp);
    if let Some(&top) = level_ups.last() {
        next.level = top;
    }

    let mut unlocked = Vec::new();
    for achievement in ACHIEVEMENTS {
        if next.achievements.contains(&achievement.id) {
            continue;
        }
        if (achievement.check)(&next, latest) {
            next.achievements.insert(achievement.id);
            next.tokens += achievement.reward;
            unlocked.push(achievement);
        }
    }

    let mut challenge = match next.daily_challenge.take() {
        Some(c) if !c.is_expired(now) => c,
        _ => DailyChallenge::generate(next.user_id, now),
    };
    let challenge_completed = if challenge.advance(&next, latest) {
        next.tokens += challenge.reward;
        Some(challenge.clone())
    } else {
        None
    };
    next.daily_challenge = Some(challenge);

    Progression {
        profile: next,
        unlocked,
        level_ups,
        challenge_completed,
    }
}
