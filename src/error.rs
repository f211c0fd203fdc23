//! Error types for the game bot

use crate::types::Symbol;
use thiserror::Error;

/// Errors raised by the game and its collaborators
#[derive(Error, Debug)]
pub enum BotError {
    /// Price oracle call failed or timed out
    #[error("Price unavailable for {symbol}: {reason}")]
    PriceUnavailable { symbol: Symbol, reason: String },

    /// Purchase or power-up rejected, profile unchanged
    #[error("Insufficient tokens: need {needed}, have {available}")]
    InsufficientTokens { needed: u64, available: u64 },

    /// Player already has an unresolved round
    #[error("Round already active on {symbol} ({remaining_secs}s remaining)")]
    AlreadyActive { symbol: Symbol, remaining_secs: i64 },

    /// Airdrop re-claim inside the 24h window
    #[error("Daily airdrop already claimed, next in {remaining_secs}s")]
    AlreadyClaimedToday { remaining_secs: i64 },

    /// Post-round cooldown still running
    #[error("Cooldown active: {remaining_secs}s remaining")]
    Cooldown { remaining_secs: i64 },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("No active round")]
    NoActiveRound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for BotError {
    fn from(e: config::ConfigError) -> Self {
        BotError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

/// Reply used when an unclassified error reaches the dispatcher
pub const GENERIC_REPLY: &str = "🔧 Something went wrong, try again in a moment.";

impl BotError {
    /// User-facing reply for recoverable game errors.
    ///
    /// Returns `None` for transport and internal failures, which the
    /// dispatcher logs and answers with [`GENERIC_REPLY`].
    pub fn user_message(&self) -> Option<String> {
        let text = match self {
            BotError::PriceUnavailable { symbol, .. } => format!(
                "🔧 Price oracle is down for {}! Try again in a moment.\n\
                Your tokens and streak are safe 💎",
                symbol
            ),
            BotError::InsufficientTokens { needed, available } => format!(
                "💸 Not enough Shard Tokens: need {}, you have {}.",
                needed, available
            ),
            BotError::AlreadyActive { symbol, remaining_secs } => format!(
                "⏰ You already have an active prediction on {}! {}s remaining.\n\
                Use /results to check its status.",
                symbol,
                (*remaining_secs).max(0)
            ),
            BotError::AlreadyClaimedToday { remaining_secs } => format!(
                "🪂 Airdrop already claimed. Next one in {}h {}m.",
                remaining_secs / 3600,
                (remaining_secs % 3600) / 60
            ),
            BotError::Cooldown { remaining_secs } => {
                format!("⏰ Chill anon! {}s cooldown remaining.", remaining_secs)
            }
            BotError::UnknownSymbol(s) => format!(
                "❓ Unknown coin: {}\nSupported: {}",
                s,
                Symbol::ALL
                    .iter()
                    .map(|s| s.ticker())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            BotError::InvalidCommand(usage) => format!("❌ {}", usage),
            BotError::NoActiveRound => {
                "📊 No pending predictions to check. Use /results to see your history!".to_string()
            }
            BotError::Http(_)
            | BotError::Json(_)
            | BotError::Telegram(_)
            | BotError::Config(_)
            | BotError::Internal(_) => return None,
        };
        Some(text)
    }
}
