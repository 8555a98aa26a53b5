use reqwest::Url;

use super::CoinId;
use crate::chart::range::DayRange;
use crate::currency::Currency;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// URL builders for the three upstream endpoints.
///
/// Builders are pure: the same inputs always yield the same URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Config(format!("invalid API base URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            )));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `/coins/markets`: first page of the top 100 coins by market cap.
    pub fn coin_list_url(&self, currency: Currency) -> Url {
        let mut url = self.with_path(&["coins", "markets"]);
        url.query_pairs_mut()
            .append_pair("vs_currency", currency.api_code())
            .append_pair("order", "market_cap_desc")
            .append_pair("per_page", "100")
            .append_pair("page", "1")
            .append_pair("sparkline", "false");
        url
    }

    /// `/coins/{id}`
    pub fn single_coin_url(&self, id: &CoinId) -> Url {
        self.with_path(&["coins", id.as_str()])
    }

    /// `/coins/{id}/market_chart`
    pub fn historical_chart_url(&self, id: &CoinId, days: DayRange, currency: Currency) -> Url {
        let mut url = self.with_path(&["coins", id.as_str(), "market_chart"]);
        url.query_pairs_mut()
            .append_pair("vs_currency", currency.api_code())
            .append_pair("days", &days.as_param());
        url
    }

    /// Recover the parameters of a URL built by [`Self::historical_chart_url`].
    pub fn parse_historical_chart_url(&self, url: &Url) -> Result<(CoinId, DayRange, Currency)> {
        let base_len = self.base_segments().len();
        let segments: Vec<String> = match url.path_segments() {
            Some(segs) => segs.map(decode_segment).collect::<Result<_>>()?,
            None => Vec::new(),
        };

        let tail = segments.get(base_len..).unwrap_or_default();
        let id = match tail {
            [coins, id, chart] if coins == "coins" && chart == "market_chart" => {
                CoinId::new(id.clone())?
            }
            _ => {
                return Err(Error::Parse(format!(
                    "'{}' is not a historical chart URL",
                    url
                )));
            }
        };

        let mut days = None;
        let mut currency = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "days" => days = Some(value.parse::<DayRange>()?),
                "vs_currency" => currency = Some(value.parse::<Currency>()?),
                _ => {}
            }
        }

        let days = days.ok_or_else(|| Error::Parse("chart URL is missing 'days'".into()))?;
        let currency =
            currency.ok_or_else(|| Error::Parse("chart URL is missing 'vs_currency'".into()))?;

        Ok((id, days, currency))
    }

    fn base_segments(&self) -> Vec<&str> {
        self.base
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    fn with_path(&self, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Base was checked in `new`, so it always has path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(tail);
        }
        url
    }
}

fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|err| Error::Parse(format!("path segment '{}' is not UTF-8: {}", segment, err)))
}
