use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crypto_tracker::api::coingecko::CoinGecko;
use crypto_tracker::chart::DayRange;
use crypto_tracker::config::{self, AppConfig};
use crypto_tracker::currency::Currency;
use crypto_tracker::error::{Error, Result};
use crypto_tracker::shell::{App, Route};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "crypto-tracker",
    version,
    about = "Browse cryptocurrency prices and price history from your terminal"
)]
struct Cli {
    /// Route to open: `/` for the coin list or `/coins/<id>` for one coin
    #[arg(default_value = "/")]
    route: String,

    /// Display currency (USD, INR, EUR, GBP)
    #[arg(long, short, env = "CRYPTO_TRACKER_CURRENCY")]
    currency: Option<String>,

    /// Chart range for coin pages (1, 7, 14, 30, 90, 180, 365, max)
    #[arg(long, short)]
    days: Option<String>,

    /// Output the page model as JSON
    #[arg(long, conflicts_with = "interactive")]
    json: bool,

    /// Keep a coin page open and read range/currency commands from stdin
    #[arg(long, short)]
    interactive: bool,

    /// Explicit config file path (overrides XDG lookup)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flag first, then config file, then the built-in default.
fn resolve_currency(flag: Option<&str>, app_config: &AppConfig) -> Result<Currency> {
    match flag {
        Some(raw) => raw.parse(),
        None => Ok(app_config.default_currency()?.unwrap_or_default()),
    }
}

fn resolve_days(flag: Option<&str>, app_config: &AppConfig) -> Result<DayRange> {
    match flag {
        Some(raw) => raw.parse(),
        None => Ok(app_config.default_days()?.unwrap_or_default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env before CLI parsing so env-backed args pick it up.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!(error = %e, "fatal error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app_config = match cli.config.as_deref() {
        Some(path) => config::load_from_path(path)?,
        None => config::load()?,
    };

    let currency = resolve_currency(cli.currency.as_deref(), &app_config)?;
    let days = resolve_days(cli.days.as_deref(), &app_config)?;
    let route: Route = cli.route.parse()?;

    let client = CoinGecko::with_options(app_config.base_url(), app_config.timeout()?)?;
    info!(route = %route, currency = %currency, days = %days, "starting");

    let app = App::new(Arc::new(client), currency, app_config.fetch_policy());

    if cli.interactive {
        let Route::Detail(id) = route else {
            return Err(Error::Route(format!(
                "{} (interactive mode needs /coins/<id>)",
                cli.route
            )));
        };

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        return app
            .run_detail(id, days, stdin, |frame| {
                let _ = writeln!(stdout, "{}\n", frame);
                let _ = stdout.flush();
            })
            .await;
    }

    if cli.json {
        println!("{}", app.render_route_json(&route, days).await?);
    } else {
        println!("{}", app.render_route(&route, days).await);
    }

    Ok(())
}
