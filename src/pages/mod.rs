pub mod detail;
pub mod list;

pub use detail::CoinDetailPage;
pub use list::CoinListPage;
