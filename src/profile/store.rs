//! Profile store
//!
//! A single lock guards profiles and chat rosters together so profile
//! creation and OG assignment stay atomic. The lock is never held across
//! an await.

use super::PlayerProfile;
use crate::config::GameConfig;
use crate::error::{BotError, Result};
use crate::progression::{self, DailyChallenge};
use crate::round::{rewards, PowerUpCost, PredictionRound, RoundOutcome, RoundRecord, RoundReport};
use crate::types::{ChatId, PowerUp, UserId};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use tracing::{error, info};

#[derive(Debug, Default)]
struct ChatRoster {
    og_count: u32,
    members: BTreeSet<UserId>,
}

#[derive(Debug, Default)]
struct StoreInner {
    profiles: HashMap<UserId, PlayerProfile>,
    chats: HashMap<ChatId, ChatRoster>,
}

pub struct ProfileStore {
    config: GameConfig,
    inner: RwLock<StoreInner>,
}

impl ProfileStore {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn get(&self, user_id: UserId) -> Option<PlayerProfile> {
        self.inner.read().profiles.get(&user_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch or create the player's profile and record chat membership.
    ///
    /// OG status is decided only here, at creation, against the chat's cap.
    pub fn get_or_create(&self, user_id: UserId, display_name: &str, chat_id: ChatId) -> PlayerProfile {
        let mut inner = self.inner.write();
        let StoreInner { profiles, chats } = &mut *inner;
        let roster = chats.entry(chat_id).or_default();
        roster.members.insert(user_id);

        if let Some(profile) = profiles.get_mut(&user_id) {
            if !display_name.is_empty() && profile.display_name != display_name {
                profile.display_name = display_name.to_string();
            }
            return profile.clone();
        }

        let og = roster.og_count < self.config.og_cap;
        if og {
            roster.og_count += 1;
        }
        let profile = PlayerProfile::new(
            user_id,
            display_name,
            chat_id,
            self.config.starting_tokens,
            og,
            Utc::now(),
        );
        info!(
            "New player {} ({}) in chat {}{}",
            user_id,
            display_name,
            chat_id,
            if og { " [OG]" } else { "" }
        );
        profiles.insert(user_id, profile.clone());
        profile
    }

    /// Run a mutation against one profile under the write lock
    pub(crate) fn update<T, F>(&self, user_id: UserId, f: F) -> Result<T>
    where
        F: FnOnce(&mut PlayerProfile) -> Result<T>,
    {
        let mut inner = self.inner.write();
        let profile = inner
            .profiles
            .get_mut(&user_id)
            .ok_or_else(|| BotError::Internal(format!("no profile for user {}", user_id)))?;
        f(profile)
    }

    /// Buy a power-up; profile unchanged when unaffordable
    pub fn purchase_power_up(&self, user_id: UserId, kind: PowerUp) -> Result<PlayerProfile> {
        let price = self.config.price_of(kind);
        self.update(user_id, |profile| {
            if profile.tokens < price {
                return Err(BotError::InsufficientTokens {
                    needed: price,
                    available: profile.tokens,
                });
            }
            profile.tokens -= price;
            profile.add_power_up(kind);
            info!("User {} bought {} for {} tokens", user_id, kind, price);
            Ok(profile.clone())
        })
    }

    /// Pay for Whale Mode: owned power-up first, else buy one outright
    pub(crate) fn charge_whale(&self, user_id: UserId) -> Result<PowerUpCost> {
        let price = self.config.whale_cost;
        self.update(user_id, |profile| {
            if profile.take_power_up(PowerUp::WhaleMode) {
                return Ok(PowerUpCost::Inventory);
            }
            if profile.tokens < price {
                return Err(BotError::InsufficientTokens {
                    needed: price,
                    available: profile.tokens,
                });
            }
            profile.tokens -= price;
            Ok(PowerUpCost::Tokens(price))
        })
    }

    /// Return a failed round's power-up cost
    pub fn refund(&self, user_id: UserId, cost: PowerUpCost) {
        let result = self.update(user_id, |profile| {
            match cost {
                PowerUpCost::None => {}
                PowerUpCost::Inventory => profile.add_power_up(PowerUp::WhaleMode),
                PowerUpCost::Tokens(amount) => profile.tokens += amount,
            }
            Ok(())
        });
        if let Err(e) = result {
            error!("Refund of {:?} to user {} lost: {}", cost, user_id, e);
        }
    }

    /// Note a failed round in history without touching stats
    pub fn record_failure(&self, round: &PredictionRound, now: DateTime<Utc>) {
        let cap = self.config.history_len;
        let result = self.update(round.user_id, |profile| {
            let record = RoundRecord::failed(round, profile.streak, now);
            profile.push_history(record, cap);
            Ok(())
        });
        if let Err(e) = result {
            error!("Failed round {} not recorded for user {}: {}", round.id, round.user_id, e);
        }
    }

    /// Settle a resolved round and run the progression rules
    pub fn apply_round_outcome(
        &self,
        round: &PredictionRound,
        outcome: &RoundOutcome,
        now: DateTime<Utc>,
    ) -> Result<RoundReport> {
        let config = &self.config;
        self.update(round.user_id, |profile| {
            let (settlement, record) = rewards::settle(profile, round, outcome, config, now);
            let progression = progression::evaluate(profile, &record, now);
            *profile = progression.profile.clone();
            Ok(RoundReport {
                round: round.clone(),
                outcome: outcome.clone(),
                settlement,
                record,
                progression,
            })
        })
    }

    pub fn claim_daily_airdrop(&self, user_id: UserId) -> Result<u64> {
        self.claim_daily_airdrop_at(user_id, Utc::now())
    }

    /// Credit a random airdrop once per rolling 24 hours
    pub fn claim_daily_airdrop_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<u64> {
        let (min, max) = (self.config.airdrop_min, self.config.airdrop_max);
        self.update(user_id, |profile| {
            if let Some(last) = profile.last_airdrop {
                let next = last + Duration::hours(24);
                if now < next {
                    return Err(BotError::AlreadyClaimedToday {
                        remaining_secs: (next - now).num_seconds(),
                    });
                }
            }
            let amount = rand::rng().random_range(min..=max);
            profile.tokens += amount;
            profile.last_airdrop = Some(now);
            Ok(amount)
        })
    }

    /// Current daily challenge, regenerated when missing or expired
    pub fn daily_challenge(&self, user_id: UserId, now: DateTime<Utc>) -> Result<DailyChallenge> {
        self.update(user_id, |profile| {
            let challenge = match profile.daily_challenge.take() {
                Some(c) if !c.is_expired(now) => c,
                _ => DailyChallenge::generate(user_id, now),
            };
            profile.daily_challenge = Some(challenge.clone());
            Ok(challenge)
        })
    }

    /// Profiles of everyone who has played in a chat
    pub fn members(&self, chat_id: ChatId) -> Vec<PlayerProfile> {
        let inner = self.inner.read();
        inner
            .chats
            .get(&chat_id)
            .map(|roster| {
                roster
                    .members
                    .iter()
                    .filter_map(|id| inner.profiles.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn og_count(&self, chat_id: ChatId) -> u32 {
        self.inner.read().chats.get(&chat_id).map_or(0, |r| r.og_count)
    }
}
