pub mod coingecko;
pub mod endpoints;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chart::range::DayRange;
use crate::currency::Currency;
use crate::error::{Error, FetchError, Result};

/// Opaque upstream coin key, e.g. `bitcoin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinId(String);

impl CoinId {
    /// Wrap a coin id. Only emptiness is checked; the id is otherwise passed
    /// through verbatim.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Parse("coin id cannot be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the top-coins listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

/// Single-coin detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_cap_rank: Option<u32>,
    pub description: Option<String>,
    pub current_price: HashMap<String, f64>,
    pub market_cap: HashMap<String, f64>,
}

impl CoinDetail {
    pub fn price_in(&self, currency: Currency) -> Option<f64> {
        self.current_price.get(currency.api_code()).copied()
    }

    pub fn market_cap_in(&self, currency: Currency) -> Option<f64> {
        self.market_cap.get(currency.api_code()).copied()
    }
}

/// A single historical price point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub price: f64,
}

/// Historical prices in upstream order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
}

/// Source of market data used by the pages and the chart view.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Top coins by market cap, priced in `currency`.
    async fn coin_list(&self, currency: Currency) -> std::result::Result<Vec<CoinMarket>, FetchError>;

    /// Detail for a single coin.
    async fn coin(&self, id: &CoinId) -> std::result::Result<CoinDetail, FetchError>;

    /// Historical prices for the chart.
    async fn historical_chart(
        &self,
        id: &CoinId,
        days: DayRange,
        currency: Currency,
    ) -> std::result::Result<PriceSeries, FetchError>;
}
