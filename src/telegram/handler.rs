//! Command handler: turns a parsed command into a reply

use super::{BotCommand, ChatContext};
use crate::config::GameConfig;
use crate::error::{BotError, Result, GENERIC_REPLY};
use crate::profile::ProfileStore;
use crate::round::RoundManager;
use crate::social;
use crate::types::{PowerUp, Symbol};
use chrono::Utc;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use std::time::Instant;

/// Processes commands from Telegram against the shared game state
pub struct CommandHandler {
    config: GameConfig,
    rounds: Arc<RoundManager>,
    profiles: Arc<ProfileStore>,
}

impl CommandHandler {
    pub fn new(config: GameConfig, rounds: Arc<RoundManager>, profiles: Arc<ProfileStore>) -> Self {
        Self { config, rounds, profiles }
    }

    /// Reply text for a command. Never fails: game errors become their
    /// user message, anything else is logged and answered generically.
    pub async fn handle(&self, ctx: &ChatContext, cmd: BotCommand) -> String {
        match self.execute(ctx, cmd).await {
            Ok(reply) => reply,
            Err(e) => match e.user_message() {
                Some(reply) => {
                    tracing::debug!("User {} got game error: {}", ctx.user_id, e);
                    reply
                }
                None => {
                    tracing::error!("Command from user {} in chat {} failed: {}", ctx.user_id, ctx.chat_id, e);
                    GENERIC_REPLY.to_string()
                }
            },
        }
    }

    async fn execute(&self, ctx: &ChatContext, cmd: BotCommand) -> Result<String> {
        let profile = self.profiles.get_or_create(ctx.user_id, &ctx.display_name, ctx.chat_id);

        match cmd {
            BotCommand::Start => Ok(social::welcome(&profile)),
            BotCommand::Help => Ok(social::help_text()),
            BotCommand::Predict { symbol, direction, whale } => {
                let symbol = symbol.unwrap_or_else(random_symbol);
                let round = self
                    .rounds
                    .start_round(ctx.user_id, ctx.chat_id, symbol, direction, whale)
                    .await?;
                let profile = self.profiles.get(ctx.user_id).unwrap_or(profile);
                Ok(social::round_started(&round, &profile, self.config.round_secs))
            }
            BotCommand::Profile => Ok(social::profile_card(&profile)),
            BotCommand::Leaderboard(metric) => {
                Ok(social::leaderboard(self.profiles.members(ctx.chat_id), metric))
            }
            BotCommand::Shop(None) => Ok(social::shop_menu(&profile, &self.config)),
            BotCommand::Shop(Some(item)) => self.buy(ctx, item),
            BotCommand::Daily => self.daily(ctx),
            BotCommand::Results => {
                let active = self.rounds.active_round(ctx.user_id);
                Ok(social::results(&profile, active.as_ref(), Utc::now()))
            }
            BotCommand::Check => {
                // Result itself is announced by the round manager
                let report = self.rounds.check_overdue(ctx.user_id).await?;
                Ok(format!(
                    "🔄 Resolved your overdue {} prediction.",
                    report.round.symbol
                ))
            }
            BotCommand::Challenge => Ok(social::battles_coming_soon()),
            BotCommand::TestApi => Ok(self.ping_oracle().await),
        }
    }

    fn buy(&self, ctx: &ChatContext, item: PowerUp) -> Result<String> {
        let profile = self.profiles.purchase_power_up(ctx.user_id, item)?;
        Ok(social::purchase_receipt(&profile, item, self.config.price_of(item)))
    }

    fn daily(&self, ctx: &ChatContext) -> Result<String> {
        let now = Utc::now();
        let claim = match self.profiles.claim_daily_airdrop_at(ctx.user_id, now) {
            Ok(amount) => {
                let total = self.profiles.get(ctx.user_id).map_or(0, |p| p.tokens);
                social::airdrop_claimed(amount, total)
            }
            Err(e @ BotError::AlreadyClaimedToday { .. }) => e.user_message().unwrap_or_default(),
            Err(e) => return Err(e),
        };
        let challenge = self.profiles.daily_challenge(ctx.user_id, now)?;
        Ok(format!("{}\n\n{}", claim, social::daily_challenge(&challenge)))
    }

    async fn ping_oracle(&self) -> String {
        let oracle = self.rounds.oracle();
        let tier = oracle.tier();
        let started = Instant::now();
        let result = oracle.spot_price(Symbol::Btc).await.map_err(|e| e.to_string());
        social::oracle_status(
            tier,
            result,
            started.elapsed().as_millis(),
            self.config.cooldown_secs(tier),
        )
    }
}

fn random_symbol() -> Symbol {
    Symbol::ALL.choose(&mut rand::rng()).copied().unwrap_or(Symbol::Btc)
}
