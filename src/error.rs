use thiserror::Error;

/// Classified failure of a single market-data request.
///
/// These are the only failure kinds the chart view ever shows; each one is
/// scoped to the component that issued the request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered with HTTP 429.
    #[error("Rate limit exceeded. Please try again in a few minutes.")]
    RateLimited,

    /// No response could be obtained at all (DNS, refused connection, ...).
    #[error("Network error. CoinGecko API may be unavailable or blocking requests.")]
    NetworkUnavailable,

    /// Anything else: timeouts, other statuses, undecodable bodies.
    #[error("Failed to fetch price data. Please try again later.")]
    Unknown,
}

impl FetchError {
    /// Classify a `reqwest` failure from sending a request.
    ///
    /// Any send failure that produced no response is "unavailable", except a
    /// timeout or a request that could not be built, which are generic.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_builder() || err.is_status() {
            Self::Unknown
        } else {
            Self::NetworkUnavailable
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else {
            Self::Unknown
        }
    }
}

/// Unified error type for the crypto-tracker application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No route matches '{0}'")]
    Route(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        assert_eq!(
            FetchError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
            FetchError::RateLimited
        );
    }

    #[test]
    fn other_statuses_are_unknown() {
        for code in [400u16, 403, 404, 500, 502, 503] {
            let status = reqwest::StatusCode::from_u16(code).unwrap();
            assert_eq!(FetchError::from_status(status), FetchError::Unknown);
        }
    }

    #[test]
    fn fetch_error_converts_into_crate_error() {
        let err: Error = FetchError::NetworkUnavailable.into();
        assert!(err.to_string().contains("Network error"));
    }
}
