//! Prediction round manager
//!
//! A round locks a start price, waits for the round window on its own
//! scheduled task, then re-prices and settles. One active round per player.

pub mod rewards;
pub mod scheduler;
#[cfg(test)]
mod tests;

pub use rewards::Settlement;
pub use scheduler::RoundScheduler;

use crate::config::GameConfig;
use crate::error::{BotError, Result};
use crate::notify::Notifier;
use crate::oracle::PriceOracle;
use crate::profile::ProfileStore;
use crate::progression::Progression;
use crate::social;
use crate::types::{ChatId, Direction, RoundId, Symbol, UserId};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What was paid to play Whale Mode, refunded if the round fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpCost {
    None,
    /// An owned power-up was consumed
    Inventory,
    /// Bought on the spot
    Tokens(u64),
}

/// An unresolved prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRound {
    pub id: RoundId,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub start_price: Decimal,
    pub whale_mode: bool,
    pub power_up_cost: PowerUpCost,
    /// Minimum absolute move in percent
    pub threshold_pct: Decimal,
    pub fud: bool,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub resolved: bool,
}

impl PredictionRound {
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }
}

/// Price comparison for a resolved round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub start_price: Decimal,
    pub end_price: Decimal,
    pub change_pct: Decimal,
    pub won: bool,
}

/// Win iff the move reaches the threshold in the chosen direction
pub fn evaluate_outcome(
    start_price: Decimal,
    end_price: Decimal,
    direction: Direction,
    threshold_pct: Decimal,
) -> RoundOutcome {
    let change_pct = if start_price.is_zero() {
        Decimal::ZERO
    } else {
        (end_price - start_price) / start_price * Decimal::ONE_HUNDRED
    };
    let won = match direction {
        Direction::Up => change_pct >= threshold_pct,
        Direction::Down => change_pct <= -threshold_pct,
    };
    RoundOutcome { start_price, end_price, change_pct, won }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Won { tokens: u64 },
    Lost,
    /// Oracle failed; stats untouched, cost refunded
    Failed,
}

/// Settled round kept in the player's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: RoundId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub start_price: Decimal,
    pub end_price: Option<Decimal>,
    pub change_pct: Option<Decimal>,
    pub status: RoundStatus,
    pub whale_mode: bool,
    pub resolved_at: DateTime<Utc>,
    pub streak_after: u32,
    pub streak_lost: u32,
}

impl RoundRecord {
    pub fn failed(round: &PredictionRound, streak: u32, now: DateTime<Utc>) -> Self {
        Self {
            round_id: round.id,
            symbol: round.symbol,
            direction: round.direction,
            start_price: round.start_price,
            end_price: None,
            change_pct: None,
            status: RoundStatus::Failed,
            whale_mode: round.whale_mode,
            resolved_at: now,
            streak_after: streak,
            streak_lost: 0,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self.status, RoundStatus::Won { .. })
    }
}

/// Everything produced by settling one round
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: PredictionRound,
    pub outcome: RoundOutcome,
    pub settlement: Settlement,
    pub record: RoundRecord,
    pub progression: Progression,
}

/// Owns active rounds and their resolution tasks
pub struct RoundManager {
    config: GameConfig,
    oracle: Arc<dyn PriceOracle>,
    profiles: Arc<ProfileStore>,
    notifier: Notifier,
    active: Mutex<HashMap<UserId, PredictionRound>>,
    scheduler: RoundScheduler,
}

impl RoundManager {
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn PriceOracle>,
        profiles: Arc<ProfileStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            oracle,
            profiles,
            notifier,
            active: Mutex::new(HashMap::new()),
            scheduler: RoundScheduler::new(),
        }
    }

    pub fn oracle(&self) -> &Arc<dyn PriceOracle> {
        &self.oracle
    }

    pub fn active_round(&self, user_id: UserId) -> Option<PredictionRound> {
        self.active.lock().get(&user_id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    fn already_active(round: &PredictionRound, now: DateTime<Utc>) -> BotError {
        BotError::AlreadyActive {
            symbol: round.symbol,
            remaining_secs: round.remaining_secs(now),
        }
    }

    /// Open a round and arm its resolution timer.
    ///
    /// Nothing is charged unless the start price was fetched and the round
    /// was stored.
    pub async fn start_round(
        self: &Arc<Self>,
        user_id: UserId,
        chat_id: ChatId,
        symbol: Symbol,
        direction: Direction,
        whale_mode: bool,
    ) -> Result<PredictionRound> {
        let now = Utc::now();
        let busy = self.active.lock().get(&user_id).map(|r| Self::already_active(r, now));
        if let Some(err) = busy {
            return Err(err);
        }

        let profile = self
            .profiles
            .get(user_id)
            .ok_or_else(|| BotError::Internal(format!("no profile for user {}", user_id)))?;

        let cooldown = self.config.cooldown_secs(self.oracle.tier()) as i64;
        if let Some(last) = profile.last_played {
            let elapsed = (now - last).num_seconds();
            if elapsed < cooldown {
                return Err(BotError::Cooldown { remaining_secs: cooldown - elapsed });
            }
        }

        let start_price = self
            .oracle
            .spot_price(symbol)
            .await
            .map_err(|e| price_unavailable(symbol, e))?;

        let fud = self.config.fud_chance > 0.0 && rand::rng().random_bool(self.config.fud_chance);
        let threshold_pct = if fud {
            self.config.fud_threshold_pct
        } else {
            self.config.move_threshold_pct
        };

        let created_at = Utc::now();
        let round = {
            let mut active = self.active.lock();
            if let Some(existing) = active.get(&user_id) {
                return Err(Self::already_active(existing, created_at));
            }

            let power_up_cost = if whale_mode {
                self.profiles.charge_whale(user_id)?
            } else {
                PowerUpCost::None
            };

            let round = PredictionRound {
                id: uuid::Uuid::new_v4(),
                user_id,
                chat_id,
                symbol,
                direction,
                start_price,
                whale_mode,
                power_up_cost,
                threshold_pct,
                fud,
                created_at,
                deadline: created_at
                    + Duration::from_std(self.config.round_duration())
                        .unwrap_or_else(|_| Duration::seconds(60)),
                resolved: false,
            };
            active.insert(user_id, round.clone());
            round
        };

        let manager = Arc::clone(self);
        let id = round.id;
        self.scheduler.schedule(id, self.config.round_duration(), async move {
            manager.scheduler.complete(&id);
            match manager.resolve_round(id).await {
                Ok(_) | Err(BotError::NoActiveRound) => {}
                Err(BotError::PriceUnavailable { .. }) => {}
                Err(e) => error!("Resolution of round {} failed: {}", id, e),
            }
        });

        info!(
            "Round {} started: user {} {} {} @ ${}{}{}",
            round.id,
            user_id,
            symbol,
            direction,
            start_price,
            if whale_mode { " [whale]" } else { "" },
            if fud { " [fud]" } else { "" },
        );
        Ok(round)
    }

    fn take_active(&self, id: RoundId) -> Option<PredictionRound> {
        let mut active = self.active.lock();
        let user_id = active.iter().find(|(_, r)| r.id == id).map(|(u, _)| *u)?;
        let mut round = active.remove(&user_id)?;
        round.resolved = true;
        Some(round)
    }

    /// Settle a round. Runs at most once per round; later calls get
    /// `NoActiveRound`.
    pub(crate) async fn resolve_round(&self, id: RoundId) -> Result<RoundReport> {
        let round = self.take_active(id).ok_or(BotError::NoActiveRound)?;
        self.scheduler.cancel(&id);
        let now = Utc::now();

        let end_price = match self.oracle.spot_price(round.symbol).await {
            Ok(price) => price,
            Err(e) => {
                warn!("Round {} failed closed, refunding {:?}: {}", id, round.power_up_cost, e);
                self.profiles.refund(round.user_id, round.power_up_cost);
                self.profiles.record_failure(&round, now);
                self.notifier.send(round.chat_id, &social::round_failed(&round)).await;
                return Err(price_unavailable(round.symbol, e));
            }
        };

        let outcome = evaluate_outcome(round.start_price, end_price, round.direction, round.threshold_pct);
        let report = self.profiles.apply_round_outcome(&round, &outcome, now)?;

        info!(
            "Round {} {}: user {} {} {:+.2}% -> {} tokens (+{} bonus), streak {}",
            id,
            if outcome.won { "WON" } else { "LOST" },
            round.user_id,
            round.symbol,
            outcome.change_pct,
            report.settlement.tokens,
            report.progression.bonus_tokens(),
            report.progression.profile.streak,
        );

        self.announce(&report).await;
        Ok(report)
    }

    /// Resolve the player's round if its deadline has passed
    pub async fn check_overdue(&self, user_id: UserId) -> Result<RoundReport> {
        let round = self.active_round(user_id).ok_or(BotError::NoActiveRound)?;
        let now = Utc::now();
        if !round.is_due(now) {
            return Err(Self::already_active(&round, now));
        }
        info!("Manually resolving overdue round {}", round.id);
        self.resolve_round(round.id).await
    }

    async fn announce(&self, report: &RoundReport) {
        let chat = report.round.chat_id;
        let profile = &report.progression.profile;

        self.notifier.send(chat, &social::round_result(report)).await;

        for achievement in &report.progression.unlocked {
            self.notifier
                .send(chat, &social::achievement_unlocked(&profile.display_name, achievement))
                .await;
        }
        for level in &report.progression.level_ups {
            self.notifier.send(chat, &social::level_up(&profile.display_name, *level)).await;
        }
        if let Some(challenge) = &report.progression.challenge_completed {
            self.notifier
                .send(chat, &social::challenge_completed(&profile.display_name, challenge))
                .await;
        }
        if report.outcome.won && social::is_taunt_milestone(profile.streak, self.config.taunt_every) {
            self.notifier
                .send(chat, &social::streak_taunt(&profile.display_name, profile.streak))
                .await;
        }
    }

    /// Cancel every pending round. In-flight rounds are lost.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.scheduler.cancel_all();
        let dropped = {
            let mut active = self.active.lock();
            let n = active.len();
            active.clear();
            n
        };
        if dropped > 0 {
            warn!("Shutdown dropped {} pending round(s)", dropped);
        }
        cancelled.max(dropped)
    }
}

fn price_unavailable(symbol: Symbol, e: BotError) -> BotError {
    match e {
        BotError::PriceUnavailable { .. } => e,
        other => BotError::PriceUnavailable { symbol, reason: other.to_string() },
    }
}
