//! Fetch lifecycle of the historical-price chart.
//!
//! Every trigger issues a [`FetchTicket`] carrying a sequence number. Tickets
//! run independently (several may be in flight at once) and come back as
//! [`FetchOutcome`]s; [`HistoricalChart::resolve`] applies an outcome only if
//! it belongs to the most recently issued ticket. In-flight requests are never
//! cancelled, stale ones simply cannot land.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::range::DayRange;
use super::series::{self, ChartSeries};
use crate::api::{CoinId, MarketData, PriceSeries};
use crate::currency::Currency;
use crate::error::FetchError;

/// Default pause before each historical fetch, to stay under upstream rate limits.
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(1);

/// Everything a historical fetch is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartParams {
    pub coin: CoinId,
    pub days: DayRange,
    pub currency: Currency,
}

/// How a fetch cycle is paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_FETCH_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Success(ChartSeries),
    Error(FetchError),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

/// A fetch that has been triggered but not yet run.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    params: ChartParams,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn params(&self) -> &ChartParams {
        &self.params
    }

    /// Wait out the policy delay, then call the client once.
    pub async fn run<M>(self, client: &M, policy: FetchPolicy) -> FetchOutcome
    where
        M: MarketData + ?Sized,
    {
        if !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }

        let result = client
            .historical_chart(&self.params.coin, self.params.days, self.params.currency)
            .await;

        FetchOutcome {
            seq: self.seq,
            params: self.params,
            result,
        }
    }
}

/// The settled result of a [`FetchTicket`].
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    seq: u64,
    params: ChartParams,
    result: Result<PriceSeries, FetchError>,
}

impl FetchOutcome {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn params(&self) -> &ChartParams {
        &self.params
    }
}

/// State of one mounted historical chart.
#[derive(Debug)]
pub struct HistoricalChart {
    params: Option<ChartParams>,
    state: FetchState,
    latest_seq: u64,
    cycles: u64,
}

impl Default for HistoricalChart {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoricalChart {
    pub fn new() -> Self {
        Self {
            params: None,
            state: FetchState::Idle,
            latest_seq: 0,
            cycles: 0,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Parameters of the latest trigger.
    pub fn params(&self) -> Option<&ChartParams> {
        self.params.as_ref()
    }

    /// Number of times the chart has entered `Loading`.
    pub fn fetch_cycles(&self) -> u64 {
        self.cycles
    }

    /// Mount or parameter change. Returns `None` when `params` match the
    /// current trigger, so re-rendering with the same inputs does not refetch.
    pub fn trigger(&mut self, params: ChartParams) -> Option<FetchTicket> {
        if self.params.as_ref() == Some(&params) && !matches!(self.state, FetchState::Idle) {
            debug!(coin = %params.coin, "chart parameters unchanged, no fetch");
            return None;
        }
        Some(self.issue(params))
    }

    /// Refetch the current parameters unconditionally.
    pub fn retrigger(&mut self) -> Option<FetchTicket> {
        let params = self.params.clone()?;
        Some(self.issue(params))
    }

    fn issue(&mut self, params: ChartParams) -> FetchTicket {
        self.latest_seq += 1;
        self.cycles += 1;
        self.state = FetchState::Loading;
        self.params = Some(params.clone());

        info!(
            seq = self.latest_seq,
            coin = %params.coin,
            days = %params.days,
            currency = %params.currency,
            "chart fetch triggered"
        );

        FetchTicket {
            seq: self.latest_seq,
            params,
        }
    }

    /// Apply a settled fetch. Returns `false` when the outcome is stale and
    /// was discarded.
    pub fn resolve(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.seq != self.latest_seq {
            warn!(
                seq = outcome.seq,
                latest = self.latest_seq,
                "discarding stale chart result"
            );
            return false;
        }

        self.state = match outcome.result {
            Ok(prices) => {
                let chart =
                    series::reshape(&prices, outcome.params.days, outcome.params.currency);
                debug!(seq = outcome.seq, points = chart.len(), "chart fetch succeeded");
                FetchState::Success(chart)
            }
            Err(kind) => {
                warn!(seq = outcome.seq, error = %kind, "chart fetch failed");
                FetchState::Error(kind)
            }
        };
        true
    }

    /// Trigger, run and resolve in one go. Returns `false` when the
    /// parameters were unchanged and nothing was fetched.
    pub async fn load<M>(&mut self, client: &M, policy: FetchPolicy, params: ChartParams) -> bool
    where
        M: MarketData + ?Sized,
    {
        let Some(ticket) = self.trigger(params) else {
            return false;
        };
        let outcome = ticket.run(client, policy).await;
        self.resolve(outcome);
        true
    }
}
