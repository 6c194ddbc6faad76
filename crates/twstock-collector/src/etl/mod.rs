//! The ETL pipeline: reshape → derive → assemble → persist.

pub mod assemble;
pub mod derive;
pub mod pipeline;
pub mod reshape;
pub mod ticker_map;

pub use assemble::{assemble, AssembleOutcome};
pub use derive::{compute_derived, DerivedRow};
pub use pipeline::{run_price_pipeline, ChunkPolicy};
pub use reshape::{reshape, LongRow};
pub use ticker_map::build_ticker_map;
