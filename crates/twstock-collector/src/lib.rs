//! Batch collector for Taiwan equities market data.
//!
//! The core of the crate is the ETL pipeline in [`etl`]: reshape a vendor's
//! wide-format price matrix into per-ticker rows, compute day-over-day
//! derived fields with strict per-series boundaries, join to internal stock
//! ids, and persist through the batch upsert store. The [`etl::pipeline`]
//! orchestrator drives it chunk by chunk over the whole ticker universe.

pub mod config;
pub mod error;
pub mod etl;
pub mod listing_sync;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
