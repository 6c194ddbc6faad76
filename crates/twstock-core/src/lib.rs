//! Shared domain types for the Taiwan equities market-data pipeline.
//!
//! Everything here is plain data: market segments with their vendor ticker
//! suffix rules, listing reference records, the tagged raw series table
//! returned by fetch collaborators, and the fully assembled daily bar the
//! persistence layer writes.

pub mod listing;
pub mod market;
pub mod series;

pub use listing::{DailyBar, StockListing, StockRef};
pub use market::Market;
pub use series::{FetchWindow, OhlcvCells, RawSeriesTable, SeriesRow};
