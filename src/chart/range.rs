use std::fmt;
use std::str::FromStr;

use ratatui::style::{Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shell::theme;

/// How much history a chart covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DayRange {
    Days(u32),
    /// All history the upstream has.
    Max,
}

impl DayRange {
    /// Value sent as the upstream `days` query parameter.
    pub fn as_param(self) -> String {
        match self {
            Self::Days(n) => n.to_string(),
            Self::Max => "max".to_string(),
        }
    }

    /// Intraday ranges get clock-time labels instead of dates.
    pub fn is_single_day(self) -> bool {
        self == Self::Days(1)
    }
}

impl Default for DayRange {
    fn default() -> Self {
        Self::Days(1)
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

impl From<DayRange> for String {
    fn from(days: DayRange) -> Self {
        days.as_param()
    }
}

impl TryFrom<String> for DayRange {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl FromStr for DayRange {
    type Err = Error;

    /// Accepts only the values offered by [`CHART_DAYS`].
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        CHART_DAYS
            .iter()
            .map(|option| option.value)
            .find(|value| value.as_param().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::Parse(format!(
                    "invalid day range '{}' -- expected one of 1, 7, 14, 30, 90, 180, 365, max",
                    trimmed
                ))
            })
    }
}

/// One selectable chart range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeOption {
    pub label: &'static str,
    pub value: DayRange,
}

pub const CHART_DAYS: [RangeOption; 8] = [
    RangeOption {
        label: "24 Hours",
        value: DayRange::Days(1),
    },
    RangeOption {
        label: "7 Days",
        value: DayRange::Days(7),
    },
    RangeOption {
        label: "14 Days",
        value: DayRange::Days(14),
    },
    RangeOption {
        label: "30 Days",
        value: DayRange::Days(30),
    },
    RangeOption {
        label: "3 Months",
        value: DayRange::Days(90),
    },
    RangeOption {
        label: "6 Months",
        value: DayRange::Days(180),
    },
    RangeOption {
        label: "1 Year",
        value: DayRange::Days(365),
    },
    RangeOption {
        label: "Max",
        value: DayRange::Max,
    },
];

/// A rendered selector button: the option plus the style it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeButton {
    pub label: &'static str,
    pub value: DayRange,
    pub selected: bool,
    pub style: Style,
}

/// Style lookup for selector buttons, keyed on the selected flag.
pub fn button_style(selected: bool) -> Style {
    match selected {
        true => Style::default()
            .bg(theme::ACCENT)
            .fg(theme::ON_ACCENT)
            .add_modifier(Modifier::BOLD),
        false => Style::default().fg(theme::FOREGROUND),
    }
}

/// Project the fixed options onto buttons for the parent's current value.
pub fn buttons(selected: DayRange) -> Vec<RangeButton> {
    CHART_DAYS
        .iter()
        .map(|option| {
            let is_selected = option.value == selected;
            RangeButton {
                label: option.label,
                value: option.value,
                selected: is_selected,
                style: button_style(is_selected),
            }
        })
        .collect()
}

/// Resolve a user choice and hand it to the caller's callback.
///
/// `input` is either a range value (`7`, `max`) or a 1-based option number
/// prefixed with `#` (`#2` picks "7 Days"). Returns the chosen value.
pub fn select<F>(input: &str, on_select: F) -> Result<DayRange>
where
    F: FnOnce(DayRange),
{
    let trimmed = input.trim();
    let value = match trimmed.strip_prefix('#') {
        Some(index) => {
            let n: usize = index
                .parse()
                .map_err(|_| Error::Parse(format!("invalid option number '{}'", index)))?;
            CHART_DAYS
                .get(n.wrapping_sub(1))
                .map(|option| option.value)
                .ok_or_else(|| {
                    Error::Parse(format!(
                        "option number must be between 1 and {}",
                        CHART_DAYS.len()
                    ))
                })?
        }
        None => trimmed.parse()?,
    };

    on_select(value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_button_is_selected() {
        for option in CHART_DAYS {
            let rendered = buttons(option.value);
            assert_eq!(rendered.len(), CHART_DAYS.len());
            let selected: Vec<_> = rendered.iter().filter(|b| b.selected).collect();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].value, option.value);
            assert_eq!(selected[0].style, button_style(true));
        }
    }

    #[test]
    fn unselected_buttons_use_plain_style() {
        let rendered = buttons(DayRange::Days(30));
        assert!(
            rendered
                .iter()
                .filter(|b| !b.selected)
                .all(|b| b.style == button_style(false))
        );
        assert_ne!(button_style(true), button_style(false));
    }

    #[test]
    fn parse_accepts_only_offered_values() {
        assert_eq!("1".parse::<DayRange>().unwrap(), DayRange::Days(1));
        assert_eq!("365".parse::<DayRange>().unwrap(), DayRange::Days(365));
        assert_eq!("MAX".parse::<DayRange>().unwrap(), DayRange::Max);
        assert!("2".parse::<DayRange>().is_err());
        assert!("".parse::<DayRange>().is_err());
    }

    #[test]
    fn select_invokes_callback_with_value() {
        let mut chosen = None;
        let value = select("max", |v| chosen = Some(v)).unwrap();
        assert_eq!(value, DayRange::Max);
        assert_eq!(chosen, Some(DayRange::Max));
    }

    #[test]
    fn select_by_option_number() {
        let mut chosen = None;
        select("#2", |v| chosen = Some(v)).unwrap();
        assert_eq!(chosen, Some(DayRange::Days(7)));
    }

    #[test]
    fn select_rejects_out_of_range_option_without_calling_back() {
        let mut called = false;
        assert!(select("#0", |_| called = true).is_err());
        assert!(select("#9", |_| called = true).is_err());
        assert!(select("3", |_| called = true).is_err());
        assert!(!called);
    }

    #[test]
    fn serializes_as_upstream_param() {
        assert_eq!(serde_json::to_string(&DayRange::Days(7)).unwrap(), "\"7\"");
        assert_eq!(serde_json::to_string(&DayRange::Max).unwrap(), "\"max\"");
        let parsed: DayRange = serde_json::from_str("\"30\"").unwrap();
        assert_eq!(parsed, DayRange::Days(30));
    }

    #[test]
    fn single_day_only_for_one() {
        assert!(DayRange::Days(1).is_single_day());
        assert!(!DayRange::Days(7).is_single_day());
        assert!(!DayRange::Max.is_single_day());
    }
}
