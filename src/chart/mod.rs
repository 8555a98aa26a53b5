pub mod range;
pub mod series;
pub mod view;

pub use range::{CHART_DAYS, DayRange};
pub use series::ChartSeries;
pub use view::{ChartParams, FetchPolicy, FetchState, HistoricalChart};
