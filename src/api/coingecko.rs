use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use super::endpoints::{DEFAULT_BASE_URL, Endpoints};
use super::{CoinDetail, CoinId, CoinMarket, MarketData, PricePoint, PriceSeries};
use crate::chart::range::DayRange;
use crate::currency::Currency;
use crate::error::{FetchError, Result};

/// Upper bound on a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// CoinGecko market-data client -- free public API, no key required.
///
/// Performs no retries; a failed call surfaces one classified [`FetchError`].
pub struct CoinGecko {
    client: Client,
    endpoints: Endpoints,
}

impl CoinGecko {
    /// Client for the production API with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client for a custom base URL with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("crypto-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoints: Endpoints::new(base_url)?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> std::result::Result<T, FetchError> {
        debug!(url = %url, "fetching {} from CoinGecko", what);

        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                let kind = FetchError::from_transport(&err);
                warn!(error = %err, kind = ?kind, "CoinGecko {} request failed", what);
                kind
            })?;

        let status = resp.status();
        if !status.is_success() {
            let kind = FetchError::from_status(status);
            warn!(status = %status, kind = ?kind, "CoinGecko returned an error for {}", what);
            return Err(kind);
        }

        let body = resp.text().await.map_err(|err| {
            warn!(error = %err, "failed to read CoinGecko {} body", what);
            FetchError::Unknown
        })?;

        debug!(status = %status, body_len = body.len(), "CoinGecko {} response", what);
        trace!(body = %body, "CoinGecko {} response body", what);

        serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "CoinGecko {} JSON did not decode", what);
            FetchError::Unknown
        })
    }
}

/// `/coins/{id}` response shape, trimmed to what the detail page shows.
#[derive(Debug, Deserialize)]
struct CoinResponse {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    market_cap_rank: Option<u32>,
    #[serde(default)]
    description: HashMap<String, Option<String>>,
    #[serde(default)]
    market_data: Option<MarketDataResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketDataResponse {
    #[serde(default)]
    current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    market_cap: HashMap<String, Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>,
}

impl From<CoinResponse> for CoinDetail {
    fn from(raw: CoinResponse) -> Self {
        let market_data = raw.market_data.unwrap_or_default();
        let description = raw
            .description
            .get("en")
            .cloned()
            .flatten()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            id: raw.id,
            symbol: raw.symbol,
            name: raw.name,
            market_cap_rank: raw.market_cap_rank,
            description,
            current_price: flatten_quotes(market_data.current_price),
            market_cap: flatten_quotes(market_data.market_cap),
        }
    }
}

fn flatten_quotes(quotes: HashMap<String, Option<f64>>) -> HashMap<String, f64> {
    quotes
        .into_iter()
        .filter_map(|(code, value)| value.map(|v| (code, v)))
        .collect()
}

/// Turn upstream `[ms, price]` pairs into a series, keeping upstream order.
///
/// Pairs with an unrepresentable timestamp or a non-finite price are dropped.
fn series_from_pairs(pairs: Vec<[f64; 2]>) -> PriceSeries {
    let mut points = Vec::with_capacity(pairs.len());
    for [ts_ms, price] in pairs {
        if !price.is_finite() || !ts_ms.is_finite() {
            continue;
        }

        if let Some(timestamp) = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ts_ms as i64)
        {
            points.push(PricePoint { timestamp, price });
        }
    }
    PriceSeries { points }
}

#[async_trait]
impl MarketData for CoinGecko {
    async fn coin_list(
        &self,
        currency: Currency,
    ) -> std::result::Result<Vec<CoinMarket>, FetchError> {
        let url = self.endpoints.coin_list_url(currency);
        self.get_json(url, "coin list").await
    }

    async fn coin(&self, id: &CoinId) -> std::result::Result<CoinDetail, FetchError> {
        let url = self.endpoints.single_coin_url(id);
        let raw: CoinResponse = self.get_json(url, "coin detail").await?;
        Ok(raw.into())
    }

    async fn historical_chart(
        &self,
        id: &CoinId,
        days: DayRange,
        currency: Currency,
    ) -> std::result::Result<PriceSeries, FetchError> {
        let url = self.endpoints.historical_chart_url(id, days, currency);
        let payload: MarketChartResponse = self.get_json(url, "market chart").await?;
        let series = series_from_pairs(payload.prices);
        debug!(coin = %id, days = %days, points = series.points.len(), "decoded market chart");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_keeps_upstream_order_and_skips_bad_pairs() {
        let series = series_from_pairs(vec![
            [3_600_000.0, 2.0],
            [0.0, 1.0],
            [7_200_000.0, f64::NAN],
            [f64::INFINITY, 4.0],
        ]);

        let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![2.0, 1.0]);
        assert_eq!(series.points[0].timestamp.timestamp_millis(), 3_600_000);
    }

    #[test]
    fn coin_response_maps_english_description_and_quotes() {
        let raw: CoinResponse = serde_json::from_value(serde_json::json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "market_cap_rank": 1,
            "description": { "en": "  Bitcoin is the first cryptocurrency.  ", "de": "" },
            "market_data": {
                "current_price": { "usd": 50000.0, "inr": null },
                "market_cap": { "usd": 9.5e11 }
            }
        }))
        .unwrap();

        let detail = CoinDetail::from(raw);
        assert_eq!(
            detail.description.as_deref(),
            Some("Bitcoin is the first cryptocurrency.")
        );
        assert_eq!(detail.price_in(Currency::Usd), Some(50000.0));
        assert_eq!(detail.price_in(Currency::Inr), None);
        assert_eq!(detail.market_cap_in(Currency::Usd), Some(9.5e11));
    }

    #[test]
    fn coin_response_tolerates_missing_market_data() {
        let raw: CoinResponse = serde_json::from_value(serde_json::json!({
            "id": "newcoin",
            "symbol": "new",
            "name": "New Coin",
            "description": { "en": "" }
        }))
        .unwrap();

        let detail = CoinDetail::from(raw);
        assert!(detail.description.is_none());
        assert!(detail.current_price.is_empty());
        assert!(detail.market_cap_rank.is_none());
    }
}
