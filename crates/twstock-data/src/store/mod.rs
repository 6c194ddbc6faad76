//! Database-backed stores.

pub mod diagnostics;
pub mod prices;
pub mod stocks;

pub use prices::{BarSink, PriceStore};
pub use stocks::StockRepository;
