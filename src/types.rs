//! Core game types

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Telegram user id
pub type UserId = i64;

/// Telegram chat id (group or private chat)
pub type ChatId = i64;

/// Round identifier
pub type RoundId = uuid::Uuid;

/// Supported crypto assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Symbol {
    Btc,
    Eth,
    Bnb,
    Ada,
    Sol,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [Symbol::Btc, Symbol::Eth, Symbol::Bnb, Symbol::Ada, Symbol::Sol];

    /// Display ticker
    pub fn ticker(&self) -> &'static str {
        match self {
            Symbol::Btc => "BTC",
            Symbol::Eth => "ETH",
            Symbol::Bnb => "BNB",
            Symbol::Ada => "ADA",
            Symbol::Sol => "SOL",
        }
    }

    /// CoinGecko coin id
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Symbol::Btc => "bitcoin",
            Symbol::Eth => "ethereum",
            Symbol::Bnb => "binancecoin",
            Symbol::Ada => "cardano",
            Symbol::Sol => "solana",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Symbol {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(Symbol::Btc),
            "eth" | "ethereum" => Ok(Symbol::Eth),
            "bnb" | "binancecoin" => Ok(Symbol::Bnb),
            "ada" | "cardano" => Ok(Symbol::Ada),
            "sol" | "solana" => Ok(Symbol::Sol),
            _ => Err(BotError::UnknownSymbol(s.to_string())),
        }
    }
}

/// Predicted price direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Up => "📈",
            Direction::Down => "📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

impl FromStr for Direction {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" | "long" | "pump" => Ok(Direction::Up),
            "down" | "d" | "short" | "dump" => Ok(Direction::Down),
            other => Err(BotError::InvalidCommand(format!(
                "Unknown direction '{}', use up or down",
                other
            ))),
        }
    }
}

/// Shop power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    /// Triples a winning round's token reward
    WhaleMode,
    /// Absorbs one loss without resetting the streak
    StreakShield,
}

impl PowerUp {
    pub const ALL: [PowerUp; 2] = [PowerUp::WhaleMode, PowerUp::StreakShield];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUp::WhaleMode => "Whale Mode",
            PowerUp::StreakShield => "Streak Shield",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PowerUp::WhaleMode => "🐋",
            PowerUp::StreakShield => "🛡",
        }
    }
}

impl fmt::Display for PowerUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PowerUp {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "whale" | "whale_mode" | "whalemode" => Ok(PowerUp::WhaleMode),
            "shield" | "streak_shield" | "streakshield" => Ok(PowerUp::StreakShield),
            other => Err(BotError::InvalidCommand(format!(
                "Unknown item '{}'. Available: whale, shield",
                other
            ))),
        }
    }
}

/// Price API tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiTier {
    Free,
    Pro,
}

impl fmt::Display for ApiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiTier::Free => write!(f, "Free"),
            ApiTier::Pro => write!(f, "Pro"),
        }
    }
}
