use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use super::range::DayRange;
use crate::api::PriceSeries;
use crate::currency::Currency;

/// Chart-ready projection of a price series: one label per price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Reshape upstream (timestamp, price) pairs into labelled chart points.
///
/// Upstream order is kept as-is.
pub fn reshape(series: &PriceSeries, days: DayRange, currency: Currency) -> ChartSeries {
    reshape_in(series, days, currency, &Local)
}

/// [`reshape`] with an explicit timezone for the labels.
pub fn reshape_in<Tz: TimeZone>(
    series: &PriceSeries,
    days: DayRange,
    currency: Currency,
    tz: &Tz,
) -> ChartSeries
where
    Tz::Offset: std::fmt::Display,
{
    let labels = series
        .points
        .iter()
        .map(|point| point_label(point.timestamp, days, tz))
        .collect();
    let prices = series.points.iter().map(|point| point.price).collect();

    ChartSeries {
        title: dataset_title(days, currency),
        labels,
        prices,
    }
}

pub fn dataset_title(days: DayRange, currency: Currency) -> String {
    format!("Price ( Past {} Days ) in {}", days, currency)
}

fn point_label<Tz: TimeZone>(timestamp: DateTime<Utc>, days: DayRange, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = timestamp.with_timezone(tz);
    if days.is_single_day() {
        local.format("%-I:%M %p").to_string()
    } else {
        local.format("%-m/%-d/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PricePoint;

    fn series_from_pairs(pairs: &[(i64, f64)]) -> PriceSeries {
        PriceSeries {
            points: pairs
                .iter()
                .map(|&(ms, price)| PricePoint {
                    timestamp: DateTime::<Utc>::from_timestamp_millis(ms).unwrap(),
                    price,
                })
                .collect(),
        }
    }

    fn is_clock_label(label: &str) -> bool {
        let Some((clock, meridiem)) = label.split_once(' ') else {
            return false;
        };
        let Some((hour, minute)) = clock.split_once(':') else {
            return false;
        };
        let hour_ok = hour.parse::<u32>().is_ok_and(|h| (1..=12).contains(&h));
        let minute_ok = minute.len() == 2 && minute.parse::<u32>().is_ok_and(|m| m < 60);
        hour_ok && minute_ok && (meridiem == "AM" || meridiem == "PM")
    }

    fn is_date_label(label: &str) -> bool {
        let parts: Vec<&str> = label.split('/').collect();
        parts.len() == 3
            && parts[0].parse::<u32>().is_ok_and(|m| (1..=12).contains(&m))
            && parts[1].parse::<u32>().is_ok_and(|d| (1..=31).contains(&d))
            && parts[2].len() == 4
    }

    #[test]
    fn hourly_scenario_produces_time_labels() {
        let series = series_from_pairs(&[(0, 100.0), (3_600_000, 110.0)]);
        let chart = reshape(&series, DayRange::Days(1), Currency::Usd);

        assert_eq!(chart.labels.len(), 2);
        assert!(chart.labels.iter().all(|l| is_clock_label(l)), "{:?}", chart.labels);
        assert_eq!(chart.prices, vec![100.0, 110.0]);
    }

    #[test]
    fn utc_labels_are_twelve_hour_clock() {
        let series = series_from_pairs(&[(0, 1.0), (13 * 3_600_000 + 5 * 60_000, 2.0)]);
        let chart = reshape_in(&series, DayRange::Days(1), Currency::Usd, &Utc);
        assert_eq!(chart.labels, vec!["12:00 AM", "1:05 PM"]);
    }

    #[test]
    fn multi_day_ranges_produce_date_labels() {
        let pairs: Vec<(i64, f64)> = (0..10)
            .map(|i| (1_700_000_000_000 + i * 86_400_000, 40_000.0 + i as f64))
            .collect();
        let series = series_from_pairs(&pairs);

        for days in [DayRange::Days(7), DayRange::Days(365), DayRange::Max] {
            let chart = reshape(&series, days, Currency::Eur);
            assert_eq!(chart.labels.len(), pairs.len());
            assert!(chart.labels.iter().all(|l| is_date_label(l)), "{:?}", chart.labels);
        }
    }

    #[test]
    fn utc_date_label_format() {
        let series = series_from_pairs(&[(1_700_000_000_000, 1.0)]);
        let chart = reshape_in(&series, DayRange::Days(30), Currency::Usd, &Utc);
        assert_eq!(chart.labels, vec!["11/14/2023"]);
    }

    #[test]
    fn upstream_order_is_kept() {
        let series = series_from_pairs(&[(3_600_000, 5.0), (0, 3.0), (3_600_000, 5.0)]);
        let chart = reshape(&series, DayRange::Days(7), Currency::Usd);
        assert_eq!(chart.prices, vec![5.0, 3.0, 5.0]);
    }

    #[test]
    fn title_names_range_and_currency() {
        assert_eq!(
            dataset_title(DayRange::Days(7), Currency::Inr),
            "Price ( Past 7 Days ) in INR"
        );
        assert_eq!(
            dataset_title(DayRange::Max, Currency::Usd),
            "Price ( Past max Days ) in USD"
        );
    }
}
