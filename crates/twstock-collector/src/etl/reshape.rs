//! Wide-to-long reshaping of raw vendor tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use twstock_core::{OhlcvCells, RawSeriesTable};

/// One (ticker, date) observation in long format.
///
/// `close` is guaranteed present: rows without one (suspension, non-trading
/// day) are dropped here so they can never leak into change calculations as
/// if they were real trading days.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub adj_close: Option<Decimal>,
    pub volume: Option<i64>,
    pub turnover: Option<Decimal>,
}

/// Flatten a raw series table into one row per (ticker, date).
///
/// The table's shape was resolved once at the fetch boundary; this is the
/// only place that branches on it. An empty table yields an empty output.
pub fn reshape(table: RawSeriesTable) -> Vec<LongRow> {
    match table {
        RawSeriesTable::Empty => Vec::new(),
        RawSeriesTable::Single { ticker, rows } => rows
            .into_iter()
            .filter_map(|(date, cells)| long_row(&ticker, date, cells))
            .collect(),
        RawSeriesTable::Multi { rows } => rows
            .into_iter()
            .flat_map(|row| {
                let date = row.date;
                row.cells
                    .into_iter()
                    .filter_map(move |(ticker, cells)| long_row(&ticker, date, cells))
            })
            .collect(),
    }
}

fn long_row(ticker: &str, date: NaiveDate, cells: OhlcvCells) -> Option<LongRow> {
    let close = cells.close?;
    Some(LongRow {
        ticker: ticker.to_string(),
        date,
        open: cells.open,
        high: cells.high,
        low: cells.low,
        close,
        adj_close: cells.adj_close,
        volume: cells.volume,
        turnover: cells.turnover,
    })
}
