use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::coingecko::DEFAULT_TIMEOUT;
use crate::api::endpoints::DEFAULT_BASE_URL;
use crate::chart::range::DayRange;
use crate::chart::view::{DEFAULT_FETCH_DELAY, FetchPolicy};
use crate::currency::Currency;
use crate::error::{Error, Result};

/// File name used in the XDG config directory.
pub const CONFIG_FILE_NAME: &str = "crypto-tracker.toml";

/// Application configuration loaded from `$XDG_CONFIG_HOME/crypto-tracker.toml`
/// or `~/.config/crypto-tracker.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: DefaultsConfig,
    pub api: ApiConfig,
    pub chart: ChartConfig,
}

/// General defaults used when CLI flags are not provided.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub currency: Option<String>,
    pub days: Option<String>,
}

/// Upstream API settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Pause before every historical fetch, in milliseconds.
    pub fetch_delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Result<Duration> {
        match self.api.timeout_secs {
            Some(0) => Err(Error::Config(
                "[api].timeout_secs must be greater than zero".into(),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            delay: self
                .chart
                .fetch_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_FETCH_DELAY),
        }
    }

    pub fn default_currency(&self) -> Result<Option<Currency>> {
        self.defaults
            .currency
            .as_deref()
            .map(|raw| {
                raw.parse::<Currency>()
                    .map_err(|err| Error::Config(format!("[defaults].currency: {}", err)))
            })
            .transpose()
    }

    pub fn default_days(&self) -> Result<Option<DayRange>> {
        self.defaults
            .days
            .as_deref()
            .map(|raw| {
                raw.parse::<DayRange>()
                    .map_err(|err| Error::Config(format!("[defaults].days: {}", err)))
            })
            .transpose()
    }
}

/// Resolve the configuration file path based on XDG conventions.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config_home.trim().is_empty()
    {
        return Some(PathBuf::from(xdg_config_home).join(CONFIG_FILE_NAME));
    }

    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config").join(CONFIG_FILE_NAME))
}

/// Load config from disk. Returns defaults when the file does not exist.
pub fn load() -> Result<AppConfig> {
    let Some(path) = config_path() else {
        return Ok(AppConfig::default());
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(err) => {
            return Err(read_config_error(&path, err));
        }
    };

    parse(&raw).map_err(|err| parse_config_error(&path, err))
}

/// Load config from an explicit path.
///
/// Unlike [`load`], this returns an error when the file is missing.
pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path).map_err(|err| read_config_error(path, err))?;
    parse(&raw).map_err(|err| parse_config_error(path, err))
}

fn parse(raw: &str) -> std::result::Result<AppConfig, toml::de::Error> {
    toml::from_str(raw)
}

fn read_config_error(path: &Path, err: std::io::Error) -> Error {
    Error::Config(format!(
        "failed to read config file '{}': {}",
        path.display(),
        err
    ))
}

fn parse_config_error(path: &Path, err: toml::de::Error) -> Error {
    Error::Config(format!(
        "failed to parse config file '{}': {}",
        path.display(),
        err
    ))
}
