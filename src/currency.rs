use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::error::{Error, Result};

/// Fiat currencies the tracker can display prices in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Inr,
    Eur,
    Gbp,
}

impl Currency {
    /// Every selectable currency, in menu order.
    pub const ALL: [Currency; 4] = [Self::Usd, Self::Inr, Self::Eur, Self::Gbp];

    /// Upper-case display code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Inr => "INR",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    /// Lower-case code as the upstream API expects it.
    pub fn api_code(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Inr => "inr",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Inr => "\u{20b9}",
            Self::Eur => "\u{20ac}",
            Self::Gbp => "\u{00a3}",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|c| c.code()).collect();
                Error::Config(format!(
                    "unsupported currency '{}' -- choose one of {}",
                    trimmed,
                    allowed.join(", ")
                ))
            })
    }
}

/// Create the process-wide currency cell.
///
/// The returned [`CurrencySetter`] is the only way to change the selection;
/// any number of [`CurrencyReader`]s can be handed out from it.
pub fn currency_cell(initial: Currency) -> CurrencySetter {
    let (tx, _rx) = watch::channel(initial);
    CurrencySetter { tx }
}

/// Write capability for the selected currency. Owned by the shell.
#[derive(Debug)]
pub struct CurrencySetter {
    tx: watch::Sender<Currency>,
}

impl CurrencySetter {
    /// Change the selected currency. Returns `true` when the value changed.
    pub fn set(&self, currency: Currency) -> bool {
        let previous = self.tx.send_replace(currency);
        if previous != currency {
            info!(from = %previous, to = %currency, "currency changed");
            true
        } else {
            false
        }
    }

    pub fn get(&self) -> Currency {
        *self.tx.borrow()
    }

    /// Hand out a read-only view of the cell.
    pub fn reader(&self) -> CurrencyReader {
        CurrencyReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the selected currency, handed to pages.
#[derive(Debug, Clone)]
pub struct CurrencyReader {
    rx: watch::Receiver<Currency>,
}

impl CurrencyReader {
    pub fn get(&self) -> Currency {
        *self.rx.borrow()
    }

    /// Wait until the setter publishes a new value.
    ///
    /// Returns `None` once the setter has been dropped.
    pub async fn changed(&mut self) -> Option<Currency> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
