//! Raw fetch results and the table shapes the reshaper understands.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Numeric cells of one (ticker, date) observation as delivered by a vendor.
///
/// Every field is optional: suspensions, non-trading days and delistings
/// arrive as gaps, not as errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcvCells {
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adj_close: Option<Decimal>,
    pub volume: Option<i64>,
    /// Authoritative traded value, when the source supplies one.
    pub turnover: Option<Decimal>,
}

/// One date row of the multi-ticker wide table.
#[derive(Debug, Clone)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub cells: Vec<(String, OhlcvCells)>,
}

/// Tagged raw series table, resolved once at the reshaper boundary.
///
/// Vendors return either a flat single-ticker frame or a two-level
/// (field × ticker) frame; the fetch layer collapses both into this enum so
/// downstream code never re-detects the shape.
#[derive(Debug, Clone)]
pub enum RawSeriesTable {
    /// No data at all (unknown ticker, market holiday, delisted security).
    Empty,
    /// Flat frame for a single ticker.
    Single {
        ticker: String,
        rows: Vec<(NaiveDate, OhlcvCells)>,
    },
    /// Wide frame covering several tickers per date row.
    Multi { rows: Vec<SeriesRow> },
}

impl RawSeriesTable {
    pub fn is_empty(&self) -> bool {
        match self {
            RawSeriesTable::Empty => true,
            RawSeriesTable::Single { rows, .. } => rows.is_empty(),
            RawSeriesTable::Multi { rows } => rows.is_empty(),
        }
    }
}

/// Time range a fetch should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    /// Trailing window of calendar days ending today. The incremental
    /// pipeline needs at least two trading days to difference against.
    Lookback { days: u32 },
    /// Everything the vendor has, for backfill runs.
    FullHistory,
}
