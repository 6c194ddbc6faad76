//! Final record assembly: id resolution and storage defaults.

use std::collections::HashMap;

use rust_decimal::Decimal;
use twstock_core::DailyBar;

use super::derive::DerivedRow;

/// Assembled bars plus the count of rows that could not be mapped.
#[derive(Debug)]
pub struct AssembleOutcome {
    pub bars: Vec<DailyBar>,
    /// Rows dropped because their vendor ticker had no registry entry.
    pub unmapped: usize,
}

/// Resolve vendor tickers to stock ids and fill storage defaults.
///
/// Rows whose ticker is missing from the map are dropped, not errored: the
/// vendor universe is always a little ahead of the registry snapshot. The
/// caller surfaces the count through run stats. Change fields collapse from
/// `None` to zero here; a first bar has a defined no-change state in storage.
pub fn assemble(rows: Vec<DerivedRow>, ticker_map: &HashMap<String, i32>) -> AssembleOutcome {
    let mut bars = Vec::with_capacity(rows.len());
    let mut unmapped = 0usize;
    for row in rows {
        let Some(&stock_id) = ticker_map.get(&row.ticker) else {
            unmapped += 1;
            continue;
        };
        bars.push(DailyBar {
            stock_id,
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.adj_close,
            volume: row.volume,
            turnover: row.turnover,
            change_price: row.change_price.unwrap_or(Decimal::ZERO),
            change_pct: row.change_pct.unwrap_or(Decimal::ZERO),
        });
    }
    AssembleOutcome { bars, unmapped }
}
