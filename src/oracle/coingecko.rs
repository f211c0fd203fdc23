//! CoinGecko simple-price client
//!
//! Free tier: rate limited to one call per `min_interval_ms`.
//! Pro tier: `x-cg-pro-api-key` header against the pro host.

use super::{PriceOracle, PricePoint};
use crate::config::OracleConfig;
use crate::error::{BotError, Result};
use crate::types::{ApiTier, Symbol};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PRO_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Upper bound on retries after the first attempt
pub const MAX_RETRIES: u32 = 1;

/// CoinGecko price oracle
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    tier: ApiTier,
    max_retries: u32,
    cache_ttl: Duration,
    min_interval: Duration,
    cache: Mutex<HashMap<Symbol, PricePoint>>,
    /// Start time of the last free tier call
    last_call: tokio::sync::Mutex<Option<Instant>>,
}

impl CoinGeckoClient {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("CryptoClash-Bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tier = config.tier();
        let base_url = match tier {
            ApiTier::Pro => config.pro_url.clone(),
            ApiTier::Free => config.free_url.clone(),
        };
        let min_interval = match tier {
            ApiTier::Pro => Duration::ZERO,
            ApiTier::Free => Duration::from_millis(config.min_interval_ms),
        };

        info!("Price oracle: CoinGecko {} tier ({})", tier, base_url);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|_| tier == ApiTier::Pro),
            tier,
            max_retries: config.max_retries.min(MAX_RETRIES),
            cache_ttl: Duration::from_secs(config.cache_secs),
            min_interval,
            cache: Mutex::new(HashMap::new()),
            last_call: tokio::sync::Mutex::new(None),
        })
    }

    /// Fresh cached price, if any. Expired entries are never returned.
    pub(crate) fn cached(&self, symbol: Symbol) -> Option<Decimal> {
        let cache = self.cache.lock();
        let point = cache.get(&symbol)?;
        let age = (Utc::now() - point.timestamp).to_std().unwrap_or(Duration::MAX);
        if age < self.cache_ttl {
            Some(point.price)
        } else {
            None
        }
    }

    pub(crate) fn store(&self, symbol: Symbol, point: PricePoint) {
        self.cache.lock().insert(symbol, point);
    }

    /// Space out free tier request starts. The slot is released before
    /// the request is sent so a slow call never holds up the next one.
    async fn wait_for_slot(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?} before price call", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn fetch_once(&self, symbol: Symbol) -> Result<Decimal> {
        self.wait_for_slot().await;

        let url = format!("{}/simple/price", self.base_url);
        let mut request = self
            .http
            .get(&url)
            .query(&[("ids", symbol.coingecko_id()), ("vs_currencies", "usd")])
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(PRO_KEY_HEADER, key);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(BotError::PriceUnavailable {
                symbol,
                reason: "rate limited (429)".to_string(),
            });
        }

        let body: serde_json::Value = response.error_for_status()?.json().await?;
        parse_simple_price(&body, symbol).ok_or_else(|| BotError::PriceUnavailable {
            symbol,
            reason: "price missing from response".to_string(),
        })
    }
}

/// Extract `{"<id>": {"usd": <price>}}`, rejecting non-positive prices
pub(crate) fn parse_simple_price(body: &serde_json::Value, symbol: Symbol) -> Option<Decimal> {
    let raw = body.get(symbol.coingecko_id())?.get("usd")?;
    let text = match raw {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => return None,
    };
    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;
    (price > Decimal::ZERO).then_some(price)
}

#[async_trait]
impl PriceOracle for CoinGeckoClient {
    async fn spot_price(&self, symbol: Symbol) -> Result<Decimal> {
        if let Some(price) = self.cached(symbol) {
            debug!("Using cached price for {}: ${}", symbol, price);
            return Ok(price);
        }

        let attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(symbol).await {
                Ok(price) => {
                    self.store(symbol, PricePoint { price, timestamp: Utc::now() });
                    debug!("Fetched {} price: ${} (attempt {})", symbol, price, attempt);
                    return Ok(price);
                }
                Err(e) => {
                    warn!("Price fetch for {} failed (attempt {}/{}): {}", symbol, attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(BotError::PriceUnavailable { symbol, reason: last_error })
    }

    fn tier(&self) -> ApiTier {
        self.tier
    }
}
