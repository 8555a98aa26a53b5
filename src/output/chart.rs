use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap};

use crate::chart::range::{self, DayRange};
use crate::chart::series::ChartSeries;
use crate::chart::view::{FetchState, HistoricalChart};
use crate::error::{self, Error};
use crate::shell::theme;

const MIN_WIDTH: u16 = 48;
const MIN_HEIGHT: u16 = 12;

/// Reject frames too small to hold the chart and its axes.
pub fn ensure_fits(width: u16, height: u16) -> error::Result<()> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(Error::Render(format!(
            "frame {}x{} is too small for the chart (need at least {}x{})",
            width, height, MIN_WIDTH, MIN_HEIGHT
        )));
    }
    Ok(())
}

/// Render the whole chart component for its current state.
///
/// Errors are shown inline above the body; the selector is only drawn once
/// there is a chart to select for.
pub fn render_chart_view(view: &HistoricalChart, width: u16, height: u16) -> String {
    let days = view.params().map(|p| p.days).unwrap_or_default();

    match view.state() {
        FetchState::Idle | FetchState::Loading => render_loading(width),
        FetchState::Error(kind) => render_alert(&kind.to_string(), width),
        FetchState::Success(series) => {
            let mut out = render_line_chart(series, width, height);
            out.push('\n');
            out.push_str(&render_selector(days, width));
            out
        }
    }
}

/// Draw a line chart for a reshaped series.
pub fn render_line_chart(series: &ChartSeries, width: u16, height: u16) -> String {
    if series.is_empty() {
        return render_alert("No price data available for this range.", width);
    }

    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(MIN_HEIGHT));
    let points: Vec<(f64, f64)> = series
        .prices
        .iter()
        .enumerate()
        .map(|(idx, price)| (idx as f64, *price))
        .collect();

    let x_max = points.len().saturating_sub(1) as f64;
    let (y_min, y_max) = y_bounds(&points);

    let dataset = Dataset::default()
        .name(series.title.as_str())
        .graph_type(GraphType::Line)
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(series.title.as_str())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::MUTED)),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max.max(1.0)])
                .labels(x_labels(&series.labels)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format_price_label(y_min)),
                    Line::from(format_price_label(y_max)),
                ]),
        );

    let mut buffer = Buffer::empty(area);
    chart.render(area, &mut buffer);
    buffer_to_string(&buffer, area)
}

/// Draw the day-range buttons on one line.
pub fn render_selector(selected: DayRange, width: u16) -> String {
    let mut spans = Vec::new();
    for (idx, button) in range::buttons(selected).into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        let text = if button.selected {
            format!("[{}]", button.label)
        } else {
            format!(" {} ", button.label)
        };
        spans.push(Span::styled(text, button.style));
    }

    render_paragraph(Line::from(spans), width, 2)
}

/// Spinner stand-in shown while a fetch is pending.
pub fn render_loading(width: u16) -> String {
    render_paragraph(
        Line::styled("Loading price history ...", Style::default().fg(theme::ACCENT)),
        width,
        1,
    )
}

/// Inline error box scoped to a single component.
pub fn render_alert(message: &str, width: u16) -> String {
    let area = Rect::new(0, 0, width.max(MIN_WIDTH), 4);
    let paragraph = Paragraph::new(Line::styled(message.to_string(), theme::error_style()))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Error")
                .borders(Borders::ALL)
                .border_style(theme::error_style()),
        );
    let mut buffer = Buffer::empty(area);
    paragraph.render(area, &mut buffer);
    buffer_to_string(&buffer, area)
}

pub(crate) fn render_paragraph(line: Line<'_>, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(1));
    let mut buffer = Buffer::empty(area);
    Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .render(area, &mut buffer);
    buffer_to_string(&buffer, area)
}

/// First, middle and last labels along the x axis.
fn x_labels(labels: &[String]) -> Vec<Line<'static>> {
    match labels {
        [] => Vec::new(),
        [only] => vec![Line::from(only.clone())],
        [first, last] => vec![Line::from(first.clone()), Line::from(last.clone())],
        _ => {
            let mid = &labels[labels.len() / 2];
            vec![
                Line::from(labels[0].clone()),
                Line::from(mid.clone()),
                Line::from(labels[labels.len() - 1].clone()),
            ]
        }
    }
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let min = points.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::NEG_INFINITY, f64::max);

    let span = max - min;
    if span <= f64::EPSILON {
        let padding = if max.abs() <= 1.0 {
            1.0
        } else {
            (max.abs() * 0.01).max(1.0)
        };
        (min - padding, max + padding)
    } else {
        let padding = span * 0.08;
        (min - padding, max + padding)
    }
}

fn format_price_label(value: f64) -> String {
    if value.abs() >= 1_000.0 {
        format!("{value:.0}")
    } else if value.abs() >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.4}")
    }
}

/// Flatten a buffer to plain text, one line per row, trailing spaces trimmed.
pub(crate) fn buffer_to_string(buffer: &Buffer, area: Rect) -> String {
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.y..area.y + area.height {
        let mut line = String::new();
        for x in area.x..area.x + area.width {
            line.push_str(buffer[(x, y)].symbol());
        }

        while line.ends_with(' ') {
            line.pop();
        }

        lines.push(line);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CoinId, MarketData, PricePoint, PriceSeries};
    use crate::chart::series::reshape;
    use crate::chart::view::{ChartParams, FetchPolicy};
    use crate::currency::Currency;
    use crate::error::FetchError;

    fn scenario_series() -> PriceSeries {
        PriceSeries {
            points: vec![
                PricePoint {
                    timestamp: chrono::DateTime::from_timestamp_millis(0).unwrap(),
                    price: 100.0,
                },
                PricePoint {
                    timestamp: chrono::DateTime::from_timestamp_millis(3_600_000).unwrap(),
                    price: 110.0,
                },
            ],
        }
    }

    struct Scripted(Result<PriceSeries, FetchError>);

    #[async_trait::async_trait]
    impl MarketData for Scripted {
        async fn coin_list(
            &self,
            _currency: Currency,
        ) -> Result<Vec<crate::api::CoinMarket>, FetchError> {
            Err(FetchError::Unknown)
        }

        async fn coin(&self, _id: &CoinId) -> Result<crate::api::CoinDetail, FetchError> {
            Err(FetchError::Unknown)
        }

        async fn historical_chart(
            &self,
            _id: &CoinId,
            _days: DayRange,
            _currency: Currency,
        ) -> Result<PriceSeries, FetchError> {
            self.0.clone()
        }
    }

    async fn loaded_view(result: Result<PriceSeries, FetchError>) -> HistoricalChart {
        let mut view = HistoricalChart::new();
        let params = ChartParams {
            coin: CoinId::new("bitcoin").unwrap(),
            days: DayRange::Days(1),
            currency: Currency::Usd,
        };
        let policy = FetchPolicy {
            delay: std::time::Duration::ZERO,
        };
        view.load(&Scripted(result), policy, params).await;
        view
    }

    #[test]
    fn line_chart_outputs_box_with_title() {
        let series = reshape(&scenario_series(), DayRange::Days(1), Currency::Usd);
        let rendered = render_line_chart(&series, 60, 14);
        assert!(rendered.lines().count() >= 10);
        assert!(rendered.contains("Price ( Past 1 Days ) in USD"));
    }

    #[test]
    fn selector_marks_the_selected_range() {
        let rendered = render_selector(DayRange::Days(7), 120);
        assert!(rendered.contains("[7 Days]"));
        assert!(rendered.contains("24 Hours"));
        assert!(!rendered.contains("[24 Hours]"));
    }

    #[tokio::test]
    async fn successful_view_renders_chart_and_selector() {
        let view = loaded_view(Ok(scenario_series())).await;
        let rendered = render_chart_view(&view, 100, 16);
        assert!(rendered.contains("Price ( Past 1 Days ) in USD"));
        assert!(rendered.contains("[24 Hours]"));
        assert!(!rendered.contains("Error"));
    }

    #[tokio::test]
    async fn failed_view_renders_inline_message() {
        let view = loaded_view(Err(FetchError::RateLimited)).await;
        let rendered = render_chart_view(&view, 100, 16);
        assert!(rendered.contains("Rate limit exceeded"));
        assert!(!rendered.contains("24 Hours"));
    }

    #[test]
    fn idle_view_renders_loading_indicator() {
        let rendered = render_chart_view(&HistoricalChart::new(), 80, 16);
        assert!(rendered.contains("Loading"));
    }

    #[test]
    fn undersized_frames_are_render_errors() {
        assert!(ensure_fits(MIN_WIDTH, MIN_HEIGHT).is_ok());
        assert!(matches!(ensure_fits(MIN_WIDTH - 1, 40), Err(Error::Render(_))));
        assert!(matches!(ensure_fits(120, MIN_HEIGHT - 1), Err(Error::Render(_))));
    }

    #[test]
    fn x_labels_pick_first_middle_last() {
        let labels: Vec<String> = (0..5).map(|i| format!("l{i}")).collect();
        let picked: Vec<String> = x_labels(&labels).iter().map(|l| l.to_string()).collect();
        assert_eq!(picked, vec!["l0", "l2", "l4"]);
    }

    #[test]
    fn flat_series_gets_padded_bounds() {
        let (lo, hi) = y_bounds(&[(0.0, 5.0), (1.0, 5.0)]);
        assert!(lo < 5.0 && hi > 5.0);
    }
}
