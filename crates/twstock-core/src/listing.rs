//! Listing reference data and the assembled daily bar record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::Market;

/// One security from the exchange registries, ready for the `stocks` upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListing {
    /// Exchange code, e.g. `2330`. Unique across both boards.
    pub code: String,
    pub name: String,
    pub market: Market,
    pub industry: Option<String>,
    /// Security category, e.g. 股票 / ETF.
    pub category: Option<String>,
    pub list_date: Option<NaiveDate>,
}

/// Reference row read back from the `stocks` table for ticker mapping.
#[derive(Debug, Clone)]
pub struct StockRef {
    /// Surrogate id, assigned once by the database and never reissued.
    pub id: i32,
    pub code: String,
    pub market: Market,
}

/// Fully assembled price bar keyed on `(stock_id, date)`.
///
/// `close` is mandatory: rows without a close never survive the reshaper.
/// The change fields are zero for the first bar of a series ("no prior day
/// to compare" is a defined zero-change state), while genuinely missing
/// numerics stay `None` and become SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub stock_id: i32,
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub adj_close: Option<Decimal>,
    /// Traded shares.
    pub volume: Option<i64>,
    /// Traded value in TWD; estimated as close × volume when the source
    /// does not supply an authoritative figure.
    pub turnover: Option<Decimal>,
    pub change_price: Decimal,
    pub change_pct: Decimal,
}
