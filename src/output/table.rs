use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::api::{CoinDetail, CoinMarket};
use crate::currency::Currency;

const DESCRIPTION_MAX_CHARS: usize = 400;

#[derive(Tabled)]
struct CoinRow {
    #[tabled(rename = "#")]
    rank: String,
    #[tabled(rename = "Coin")]
    coin: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "24h Change")]
    change_24h: String,
    #[tabled(rename = "Market Cap")]
    market_cap: String,
}

/// Render the top-coins listing as a table.
pub fn render_coin_table(coins: &[CoinMarket], currency: Currency) -> String {
    let rows: Vec<CoinRow> = coins
        .iter()
        .map(|c| CoinRow {
            rank: c
                .market_cap_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            coin: format!("{} {}", c.symbol.to_uppercase().bold(), c.name),
            id: c.id.clone().dimmed().to_string(),
            price: c
                .current_price
                .map(|p| format_price(p, currency))
                .unwrap_or_else(|| "-".to_string()),
            change_24h: format_change(c.price_change_percentage_24h),
            market_cap: c
                .market_cap
                .map(|cap| format_market_cap(cap, currency))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render the header block of the coin detail page.
pub fn render_coin_summary(detail: &CoinDetail, currency: Currency) -> String {
    let mut lines = vec![format!(
        "{} ({})",
        detail.name.bold(),
        detail.symbol.to_uppercase()
    )];

    if let Some(description) = &detail.description {
        lines.push(first_paragraph(description, DESCRIPTION_MAX_CHARS));
    }

    lines.push(format!(
        "Rank: {}",
        detail
            .market_cap_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "Current Price: {}",
        detail
            .price_in(currency)
            .map(|p| format_price(p, currency))
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "Market Cap: {}",
        detail
            .market_cap_in(currency)
            .map(|cap| format_market_cap(cap, currency))
            .unwrap_or_else(|| "-".to_string())
    ));

    lines.join("\n")
}

fn format_change(change: Option<f64>) -> String {
    match change {
        Some(c) if c >= 0.0 => format!("+{:.2}%", c).green().to_string(),
        Some(c) => format!("{:.2}%", c).red().to_string(),
        None => "-".dimmed().to_string(),
    }
}

/// First paragraph of a description, cut at a char boundary.
fn first_paragraph(text: &str, max_chars: usize) -> String {
    let paragraph = text.split("\r\n\r\n").next().unwrap_or(text);
    let paragraph = paragraph.split("\n\n").next().unwrap_or(paragraph).trim();
    if paragraph.chars().count() <= max_chars {
        return paragraph.to_string();
    }
    let cut: String = paragraph.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

pub fn format_price(price: f64, currency: Currency) -> String {
    let sym = currency.symbol();
    if price >= 1.0 {
        format!("{}{}", sym, format_with_commas(price, 2))
    } else if price >= 0.01 {
        format!("{}{:.4}", sym, price)
    } else {
        format!("{}{:.8}", sym, price)
    }
}

fn format_with_commas(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (whole, fraction) = match formatted.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut result = String::new();
    for (i, ch) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    let whole_formatted: String = result.chars().rev().collect();

    match fraction {
        Some(f) => format!("{}.{}", whole_formatted, f),
        None => whole_formatted,
    }
}

/// Abbreviate large amounts: `$1.23T`, `$4.50B`, `$12.00M`.
pub fn format_market_cap(cap: f64, currency: Currency) -> String {
    let sym = currency.symbol();
    if cap >= 1_000_000_000_000.0 {
        format!("{}{:.2}T", sym, cap / 1_000_000_000_000.0)
    } else if cap >= 1_000_000_000.0 {
        format!("{}{:.2}B", sym, cap / 1_000_000_000.0)
    } else if cap >= 1_000_000.0 {
        format!("{}{:.2}M", sym, cap / 1_000_000.0)
    } else if cap >= 1_000.0 {
        format!("{}{:.2}K", sym, cap / 1_000.0)
    } else {
        format!("{}{:.2}", sym, cap)
    }
}
