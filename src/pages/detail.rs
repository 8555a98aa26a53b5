use serde::Serialize;
use tracing::info;

use crate::api::{CoinDetail, CoinId, MarketData};
use crate::chart::range::DayRange;
use crate::chart::series::ChartSeries;
use crate::chart::view::{ChartParams, FetchPolicy, FetchState, HistoricalChart};
use crate::currency::{Currency, CurrencyReader};
use crate::error::{FetchError, Result};
use crate::output::{chart, json, table};

/// The `/coins/:id` route: coin summary plus its historical chart.
#[derive(Debug)]
pub struct CoinDetailPage {
    pub id: CoinId,
    /// `None` until the detail request has settled.
    pub coin: Option<std::result::Result<CoinDetail, FetchError>>,
    pub chart: HistoricalChart,
    days: DayRange,
    currency: CurrencyReader,
}

#[derive(Serialize)]
struct ChartJson<'a> {
    state: &'static str,
    days: DayRange,
    currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<&'a ChartSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct DetailJson<'a> {
    id: &'a CoinId,
    #[serde(skip_serializing_if = "Option::is_none")]
    coin: Option<&'a CoinDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coin_error: Option<String>,
    chart: ChartJson<'a>,
}

impl CoinDetailPage {
    /// Create the page without fetching anything; the chart starts idle.
    pub fn new(id: CoinId, days: DayRange, currency: CurrencyReader) -> Self {
        Self {
            id,
            coin: None,
            chart: HistoricalChart::new(),
            days,
            currency,
        }
    }

    /// Mount: fetch the coin detail and run the first chart cycle together.
    pub async fn mount<M>(
        client: &M,
        policy: FetchPolicy,
        id: CoinId,
        days: DayRange,
        currency: CurrencyReader,
    ) -> Self
    where
        M: MarketData + ?Sized,
    {
        info!(coin = %id, days = %days, currency = %currency.get(), "mounting coin page");
        let mut page = Self::new(id, days, currency);
        let params = page.chart_params();

        let (coin, _) = futures::join!(
            client.coin(&page.id),
            page.chart.load(client, policy, params)
        );
        page.coin = Some(coin);
        page
    }

    pub fn days(&self) -> DayRange {
        self.days
    }

    pub fn set_days(&mut self, days: DayRange) {
        self.days = days;
    }

    pub fn currency(&self) -> Currency {
        self.currency.get()
    }

    /// Chart key built from the page's coin, range and the shared currency.
    pub fn chart_params(&self) -> ChartParams {
        ChartParams {
            coin: self.id.clone(),
            days: self.days,
            currency: self.currency.get(),
        }
    }

    pub fn render(&self, width: u16, height: u16) -> Result<String> {
        chart::ensure_fits(width, height)?;

        let summary = match &self.coin {
            Some(Ok(detail)) => table::render_coin_summary(detail, self.currency()),
            Some(Err(kind)) => chart::render_alert(&kind.to_string(), width),
            None => self.id.to_string(),
        };

        Ok(format!(
            "{}\n\n{}",
            summary,
            chart::render_chart_view(&self.chart, width, height)
        ))
    }

    pub fn render_json(&self) -> Result<String> {
        let state = self.chart.state();
        let params = self.chart.params();
        let model = DetailJson {
            id: &self.id,
            coin: self.coin.as_ref().and_then(|c| c.as_ref().ok()),
            coin_error: self
                .coin
                .as_ref()
                .and_then(|c| c.as_ref().err())
                .map(ToString::to_string),
            chart: ChartJson {
                state: state.name(),
                days: params.map(|p| p.days).unwrap_or(self.days),
                currency: params.map(|p| p.currency).unwrap_or(self.currency()),
                series: match state {
                    FetchState::Success(series) => Some(series),
                    _ => None,
                },
                error: match state {
                    FetchState::Error(kind) => Some(kind.to_string()),
                    _ => None,
                },
            },
        };
        json::to_json(&model)
    }
}
