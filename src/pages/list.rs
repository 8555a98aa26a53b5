use serde::Serialize;
use tracing::info;

use crate::api::{CoinMarket, MarketData};
use crate::currency::{Currency, CurrencyReader};
use crate::error::{FetchError, Result};
use crate::output::{chart, json, table};

/// The root route: top coins by market cap.
#[derive(Debug, Clone)]
pub struct CoinListPage {
    pub currency: Currency,
    pub coins: std::result::Result<Vec<CoinMarket>, FetchError>,
}

#[derive(Serialize)]
struct CoinListJson<'a> {
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    coins: Option<&'a [CoinMarket]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CoinListPage {
    /// Fetch the listing in the currently selected currency.
    pub async fn load<M>(client: &M, currency: &CurrencyReader) -> Self
    where
        M: MarketData + ?Sized,
    {
        let currency = currency.get();
        info!(currency = %currency, "loading coin list");
        let coins = client.coin_list(currency).await;
        Self { currency, coins }
    }

    pub fn render(&self, width: u16) -> Result<String> {
        match &self.coins {
            Ok(coins) if coins.is_empty() => Ok(chart::render_alert("No coins returned.", width)),
            Ok(coins) => Ok(format!(
                "Cryptocurrency Prices by Market Cap\n{}",
                table::render_coin_table(coins, self.currency)
            )),
            Err(kind) => Ok(chart::render_alert(&kind.to_string(), width)),
        }
    }

    pub fn render_json(&self) -> Result<String> {
        let model = CoinListJson {
            currency: self.currency,
            coins: self.coins.as_ref().ok().map(Vec::as_slice),
            error: self.coins.as_ref().err().map(ToString::to_string),
        };
        json::to_json(&model)
    }
}
