//! Price oracle adapters
//!
//! The game only needs a spot price per symbol. `CoinGeckoClient` is the
//! production adapter; tests substitute a mock.

mod coingecko;

pub use coingecko::{CoinGeckoClient, MAX_RETRIES};

use crate::error::Result;
use crate::types::{ApiTier, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Spot price observation
#[derive(Debug, Clone)]
pub struct PricePoint {
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Source of current crypto prices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Current USD price, or `PriceUnavailable`
    async fn spot_price(&self, symbol: Symbol) -> Result<Decimal>;

    /// Tier in use, for cooldown and status display
    fn tier(&self) -> ApiTier;
}
