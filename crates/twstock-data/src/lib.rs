//! Storage and data-provider collaborators.
//!
//! The ETL core in `twstock-collector` talks to the outside world only
//! through this crate: the stock repository and price store wrap the
//! database, the providers wrap the exchange and vendor HTTP endpoints.

pub mod db;
pub mod error;
pub mod provider;
pub mod store;

pub use db::DatabaseConfig;
pub use error::{DataError, Result};
pub use provider::{KlineFetcher, ListingProvider, TwseListingProvider, YahooChartProvider};
pub use store::{BarSink, PriceStore, StockRepository};
