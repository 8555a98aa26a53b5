pub mod boundary;
pub mod theme;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ratatui::text::{Line, Span};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::{CoinId, MarketData};
use crate::chart::range::{self, DayRange};
use crate::chart::view::{FetchOutcome, FetchPolicy, FetchTicket};
use crate::currency::{Currency, CurrencyReader, CurrencySetter, currency_cell};
use crate::error::{Error, Result};
use crate::output::chart::render_paragraph;
use crate::pages::{CoinDetailPage, CoinListPage};

pub const APP_TITLE: &str = "Crypto Tracker";

/// The two routes of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,
    /// `/coins/:id`
    Detail(CoinId),
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let path = raw.trim();
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = path.trim_matches('/');

        if trimmed.is_empty() {
            return Ok(Self::List);
        }

        match trimmed.split('/').collect::<Vec<_>>().as_slice() {
            ["coins", id] => CoinId::new(*id)
                .map(Self::Detail)
                .map_err(|_| Error::Route(raw.to_string())),
            _ => Err(Error::Route(raw.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("/"),
            Self::Detail(id) => write!(f, "/coins/{}", id),
        }
    }
}

/// A command typed at the interactive detail prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Refresh,
    Help,
    Currency(String),
    Range(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let cmd = match head.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Self::Quit,
            "r" | "refresh" => Self::Refresh,
            "h" | "help" | "?" => Self::Help,
            "c" | "currency" => Self::Currency(rest.trim().to_string()),
            _ => Self::Range(line.to_string()),
        };
        Some(cmd)
    }
}

const HELP: &str = "commands: <range> (1, 7, 14, 30, 90, 180, 365, max or #1-#8), \
currency <usd|inr|eur|gbp>, refresh, quit";

/// Application shell: owns the client, the currency cell and render settings.
pub struct App {
    client: Arc<dyn MarketData>,
    currency: CurrencySetter,
    policy: FetchPolicy,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(client: Arc<dyn MarketData>, currency: Currency, policy: FetchPolicy) -> Self {
        Self {
            client,
            currency: currency_cell(currency),
            policy,
            width: 100,
            height: 20,
        }
    }

    /// Override the frame size used for rendering.
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Read-only currency handle for descendants.
    pub fn currency(&self) -> CurrencyReader {
        self.currency.reader()
    }

    pub fn set_currency(&self, currency: Currency) -> bool {
        self.currency.set(currency)
    }

    pub fn render_header(&self) -> String {
        let line = Line::from(vec![
            Span::styled(APP_TITLE, theme::title_style()),
            Span::raw("  "),
            Span::raw(format!("Currency: {}", self.currency.get())),
        ]);
        render_paragraph(line, self.width, 1)
    }

    /// Load and render one route, wrapped in the error boundary.
    pub async fn render_route(&self, route: &Route, days: DayRange) -> String {
        info!(route = %route, "rendering route");
        let body = match route {
            Route::List => {
                let page = CoinListPage::load(self.client.as_ref(), &self.currency()).await;
                boundary::guard(|| page.render(self.width))
            }
            Route::Detail(id) => {
                let page = self.mount_detail(id.clone(), days).await;
                boundary::guard(|| page.render(self.width, self.height))
            }
        };
        format!("{}\n\n{}", self.render_header(), body)
    }

    /// Load one route and serialize its model as JSON.
    pub async fn render_route_json(&self, route: &Route, days: DayRange) -> Result<String> {
        match route {
            Route::List => {
                CoinListPage::load(self.client.as_ref(), &self.currency())
                    .await
                    .render_json()
            }
            Route::Detail(id) => self.mount_detail(id.clone(), days).await.render_json(),
        }
    }

    async fn mount_detail(&self, id: CoinId, days: DayRange) -> CoinDetailPage {
        CoinDetailPage::mount(self.client.as_ref(), self.policy, id, days, self.currency()).await
    }

    /// Drive the detail page from line commands until `quit` or end of input.
    ///
    /// Each range or currency change spawns a fetch; results are applied in
    /// trigger order and stale ones are dropped. Every frame is handed to
    /// `emit`.
    pub async fn run_detail<R, F>(
        &self,
        id: CoinId,
        days: DayRange,
        input: R,
        mut emit: F,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(&str),
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
        let mut page = CoinDetailPage::new(id, days, self.currency());

        // Chart fetch runs in the background while the summary loads.
        let params = page.chart_params();
        if let Some(ticket) = page.chart.trigger(params) {
            self.spawn_fetch(ticket, tx.clone());
        }
        emit(&self.frame(&page));

        page.coin = Some(self.client.coin(&page.id).await);
        emit(&self.frame(&page));
        emit(HELP);

        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            if !input_open && !page.chart.state().is_loading() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    let Some(line) = line? else {
                        debug!("input closed, waiting for pending fetch");
                        input_open = false;
                        continue;
                    };
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };

                    let ticket = match command {
                        Command::Quit => break,
                        Command::Help => {
                            emit(HELP);
                            None
                        }
                        Command::Refresh => page.chart.retrigger(),
                        Command::Currency(code) => match code.parse::<Currency>() {
                            Ok(currency) => {
                                self.set_currency(currency);
                                let params = page.chart_params();
                                page.chart.trigger(params)
                            }
                            Err(err) => {
                                emit(&err.to_string());
                                None
                            }
                        },
                        Command::Range(choice) => {
                            match range::select(&choice, |d| page.set_days(d)) {
                                Ok(_) => {
                                    let params = page.chart_params();
                                    page.chart.trigger(params)
                                }
                                Err(err) => {
                                    emit(&err.to_string());
                                    None
                                }
                            }
                        }
                    };

                    if let Some(ticket) = ticket {
                        self.spawn_fetch(ticket, tx.clone());
                        emit(&self.frame(&page));
                    }
                }
                Some(outcome) = rx.recv() => {
                    if page.chart.resolve(outcome) {
                        emit(&self.frame(&page));
                    }
                }
            }
        }

        Ok(())
    }

    fn frame(&self, page: &CoinDetailPage) -> String {
        let body = boundary::guard(|| page.render(self.width, self.height));
        format!("{}\n\n{}", self.render_header(), body)
    }

    fn spawn_fetch(&self, ticket: FetchTicket, tx: mpsc::UnboundedSender<FetchOutcome>) {
        let client = Arc::clone(&self.client);
        let policy = self.policy;
        tokio::spawn(async move {
            let outcome = ticket.run(client.as_ref(), policy).await;
            // Receiver is gone once the page unmounts.
            let _ = tx.send(outcome);
        });
    }
}
