//! HTTP data providers.

pub mod listing;
pub mod yahoo;

pub use listing::{ListingProvider, TwseListingProvider};
pub use yahoo::YahooChartProvider;

use async_trait::async_trait;
use twstock_core::{FetchWindow, RawSeriesTable};

use crate::error::Result;

/// Kline fetch collaborator.
///
/// Implementations return a wide-format series table covering the requested
/// vendor tickers and window. A ticker with no data (holiday, suspension,
/// delisting) simply contributes nothing; only transport-level failures are
/// errors, and the orchestrator treats those as chunk-local.
#[async_trait]
pub trait KlineFetcher: Send + Sync {
    async fn fetch(&self, tickers: &[String], window: &FetchWindow) -> Result<RawSeriesTable>;
}
