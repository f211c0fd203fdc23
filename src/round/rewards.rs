//! Round settlement rules: stats, streak, tokens and XP

use super::{PredictionRound, RoundOutcome, RoundRecord, RoundStatus};
use crate::config::GameConfig;
use crate::profile::PlayerProfile;
use crate::types::PowerUp;
use chrono::{DateTime, Utc};

/// What a settled round paid out
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub tokens: u64,
    pub xp: u64,
    pub shield_used: bool,
    /// Streak broken by this round, 0 when nothing was lost
    pub streak_lost: u32,
}

/// Tokens for a win with `prior_streak` wins behind it
pub fn win_tokens(config: &GameConfig, prior_streak: u32, whale_mode: bool) -> u64 {
    let base = config.base_reward + config.streak_bonus * prior_streak as u64;
    if whale_mode {
        base * config.whale_multiplier
    } else {
        base
    }
}

pub fn win_xp(config: &GameConfig, prior_streak: u32) -> u64 {
    config.win_xp + config.streak_bonus * prior_streak as u64
}

/// Fold a resolved round into the profile.
///
/// Appends the round record to the history (newest first) and returns it
/// alongside the payout.
pub fn settle(
    profile: &mut PlayerProfile,
    round: &PredictionRound,
    outcome: &RoundOutcome,
    config: &GameConfig,
    now: DateTime<Utc>,
) -> (Settlement, RoundRecord) {
    let prior_streak = profile.streak;
    profile.total_predictions += 1;
    profile.last_played = Some(now);

    let settlement = if outcome.won {
        let tokens = win_tokens(config, prior_streak, round.whale_mode);
        let xp = win_xp(config, prior_streak);
        profile.wins += 1;
        profile.streak += 1;
        profile.best_streak = profile.best_streak.max(profile.streak);
        profile.tokens += tokens;
        profile.xp += xp;
        Settlement { tokens, xp, shield_used: false, streak_lost: 0 }
    } else {
        profile.xp += config.loss_xp;
        let shield_used = prior_streak > 0 && profile.take_power_up(PowerUp::StreakShield);
        let streak_lost = if shield_used {
            0
        } else {
            profile.streak = 0;
            prior_streak
        };
        Settlement { tokens: 0, xp: config.loss_xp, shield_used, streak_lost }
    };

    let record = RoundRecord {
        round_id: round.id,
        symbol: round.symbol,
        direction: round.direction,
        start_price: round.start_price,
        end_price: Some(outcome.end_price),
        change_pct: Some(outcome.change_pct),
        status: if outcome.won {
            RoundStatus::Won { tokens: settlement.tokens }
        } else {
            RoundStatus::Lost
        },
        whale_mode: round.whale_mode,
        resolved_at: now,
        streak_after: profile.streak,
        streak_lost: settlement.streak_lost,
    };
    profile.push_history(record.clone(), config.history_len);

    (settlement, record)
}
