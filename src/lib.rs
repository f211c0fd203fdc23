//! Crypto Clash game bot
//!
//! A Telegram group game: players predict whether a coin moves at least 1%
//! up or down within a minute, earning Shard Tokens, XP, streaks and
//! achievements.
//!
//! ## Architecture
//!
//! ```text
//! Telegram (getUpdates) → parse_command → mpsc → CommandHandler
//!                                                   │
//!                          ┌────────────────────────┼──────────────┐
//!                          ↓                        ↓              ↓
//!                     RoundManager ──→ PriceOracle  ProfileStore  social
//!                          │ (scheduled resolution)  ↑
//!                          └─→ rewards → progression ┘
//!                          │
//!                          └─→ Notifier → sendMessage
//! ```

pub mod config;
pub mod error;
pub mod notify;
pub mod oracle;
pub mod profile;
pub mod progression;
pub mod round;
pub mod social;
pub mod telegram;
pub mod types;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod types_tests;
#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod error_tests;
