//! Configuration loading
//!
//! Values come from an optional TOML file, `CLASH__SECTION__KEY` environment
//! overrides, and the two credentials read straight from the environment.

use crate::error::{BotError, Result};
use crate::oracle::MAX_RETRIES;
use crate::types::{ApiTier, PowerUp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const PRICE_API_KEY_ENV: &str = "COINGECKO_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub game: GameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout for getUpdates
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// This bot's @username. Looked up with getMe when unset.
    #[serde(default)]
    pub bot_username: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
            bot_username: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_free_url")]
    pub free_url: String,
    #[serde(default = "default_pro_url")]
    pub pro_url: String,
    /// Pro tier key; free tier when absent
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
    /// Minimum spacing between free tier calls
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            free_url: default_free_url(),
            pro_url: default_pro_url(),
            api_key: None,
            timeout_secs: default_oracle_timeout(),
            max_retries: default_max_retries(),
            cache_secs: default_cache_secs(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl OracleConfig {
    pub fn tier(&self) -> ApiTier {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => ApiTier::Pro,
            _ => ApiTier::Free,
        }
    }
}

/// Game rules and economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub round_secs: u64,
    /// Minimum absolute move in percent
    pub move_threshold_pct: Decimal,
    pub starting_tokens: u64,
    pub base_reward: u64,
    /// Extra tokens and XP per streak step
    pub streak_bonus: u64,
    pub win_xp: u64,
    pub loss_xp: u64,
    pub whale_multiplier: u64,
    pub whale_cost: u64,
    pub shield_cost: u64,
    pub og_cap: u32,
    pub airdrop_min: u64,
    pub airdrop_max: u64,
    pub cooldown_free_secs: u64,
    pub cooldown_pro_secs: u64,
    /// Chance of a FUD event raising the threshold
    pub fud_chance: f64,
    pub fud_threshold_pct: Decimal,
    /// Streak multiple that triggers a taunt
    pub taunt_every: u32,
    pub history_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: 60,
            move_threshold_pct: dec!(1.0),
            starting_tokens: 1000,
            base_reward: 50,
            streak_bonus: 5,
            win_xp: 50,
            loss_xp: 10,
            whale_multiplier: 3,
            whale_cost: 500,
            shield_cost: 300,
            og_cap: 10,
            airdrop_min: 50,
            airdrop_max: 200,
            cooldown_free_secs: 45,
            cooldown_pro_secs: 30,
            fud_chance: 0.0,
            fud_threshold_pct: dec!(1.1),
            taunt_every: 5,
            history_len: 10,
        }
    }
}

impl GameConfig {
    pub fn price_of(&self, item: PowerUp) -> u64 {
        match item {
            PowerUp::WhaleMode => self.whale_cost,
            PowerUp::StreakShield => self.shield_cost,
        }
    }

    pub fn cooldown_secs(&self, tier: ApiTier) -> u64 {
        match tier {
            ApiTier::Free => self.cooldown_free_secs,
            ApiTier::Pro => self.cooldown_pro_secs,
        }
    }

    pub fn round_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.round_secs)
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_poll_timeout() -> u64 {
    30
}
fn default_free_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_pro_url() -> String {
    "https://pro-api.coingecko.com/api/v3".to_string()
}
fn default_oracle_timeout() -> u64 {
    5
}
fn default_max_retries() -> u32 {
    1
}
fn default_cache_secs() -> u64 {
    10
}
fn default_min_interval_ms() -> u64 {
    2000
}

impl Config {
    /// Load config file (optional) plus environment, then validate
    pub fn load(path: &str) -> Result<Self> {
        let cfg = Self::read(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Same layering as [`Config::load`] without validation, for the
    /// offline subcommands
    pub fn read(path: &str) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let path = shellexpand::tilde(path).into_owned();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("CLASH").separator("__"))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Layer credentials from the environment over file values
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(BOT_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(key) = lookup(PRICE_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.oracle.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(BotError::Config(format!("{} environment variable not set", BOT_TOKEN_ENV)));
        }
        if self.game.round_secs == 0 {
            return Err(BotError::Config("game.round_secs must be positive".to_string()));
        }
        if self.oracle.cache_secs >= self.game.round_secs {
            return Err(BotError::Config(
                "oracle.cache_secs must be shorter than the round".to_string(),
            ));
        }
        if self.oracle.max_retries > MAX_RETRIES {
            return Err(BotError::Config(format!(
                "oracle.max_retries must be at most {}",
                MAX_RETRIES
            )));
        }
        if self.game.airdrop_min > self.game.airdrop_max {
            return Err(BotError::Config("game.airdrop_min exceeds airdrop_max".to_string()));
        }
        if !(0.0..=1.0).contains(&self.game.fud_chance) {
            return Err(BotError::Config("game.fud_chance must be within 0..=1".to_string()));
        }
        Ok(())
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.telegram.bot_token.is_empty() {
            cfg.telegram.bot_token = "***".to_string();
        }
        if cfg.oracle.api_key.is_some() {
            cfg.oracle.api_key = Some("***".to_string());
        }
        cfg
    }
}
