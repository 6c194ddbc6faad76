//! Per-series derived fields: turnover estimate, day-over-day change.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::reshape::LongRow;

/// A long row plus the computed fields.
///
/// `change_price` and `change_pct` stay `None` on the first observation of a
/// series; the assembler decides what the stored value for "no previous bar"
/// looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub adj_close: Option<Decimal>,
    pub volume: Option<i64>,
    pub turnover: Option<Decimal>,
    pub change_price: Option<Decimal>,
    pub change_pct: Option<Decimal>,
}

/// Compute derived fields for every row, strictly within each ticker.
///
/// Rows are grouped by ticker and ordered by date before differencing, so a
/// series with a gap (dropped suspension day) differences against its last
/// real close, never against a neighbouring ticker's. Duplicate dates within
/// a ticker collapse to the last row seen: vendors can emit a live candle
/// alongside the settled one for the same trading date, and a batch with
/// two rows on one key would be rejected by the upsert statement.
pub fn compute_derived(rows: Vec<LongRow>) -> Vec<DerivedRow> {
    let mut groups: BTreeMap<String, BTreeMap<NaiveDate, LongRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.ticker.clone())
            .or_default()
            .insert(row.date, row);
    }

    let mut out = Vec::new();
    for (_, series) in groups {
        let mut prev_close: Option<Decimal> = None;
        for (_, row) in series {
            let close = row.close;
            let change_price = prev_close.map(|p| close - p);
            let change_pct = prev_close.and_then(|p| {
                if p.is_zero() {
                    None
                } else {
                    Some((close - p) / p * Decimal::ONE_HUNDRED)
                }
            });
            let turnover = row
                .turnover
                .or_else(|| row.volume.map(|v| close * Decimal::from(v)));
            out.push(DerivedRow {
                ticker: row.ticker,
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close,
                adj_close: row.adj_close,
                volume: row.volume,
                turnover,
                change_price,
                change_pct,
            });
            prev_close = Some(close);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn row(ticker: &str, date: NaiveDate, close: Decimal) -> LongRow {
        LongRow {
            ticker: ticker.to_string(),
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
            turnover: None,
        }
    }

    #[test]
    fn first_observation_has_no_change() {
        let out = compute_derived(vec![row("A.TW", day(1), dec!(100))]);
        assert_eq!(out[0].change_price, None);
        assert_eq!(out[0].change_pct, None);
    }

    #[test]
    fn change_is_against_previous_close() {
        let out = compute_derived(vec![
            row("A.TW", day(1), dec!(100)),
            row("A.TW", day(2), dec!(110)),
        ]);
        assert_eq!(out[1].change_price, Some(dec!(10)));
        assert_eq!(out[1].change_pct, Some(dec!(10)));
    }

    #[test]
    fn interleaved_tickers_do_not_cross_contaminate() {
        let out = compute_derived(vec![
            row("A.TW", day(1), dec!(100)),
            row("B.TW", day(1), dec!(50)),
            row("A.TW", day(2), dec!(101)),
            row("B.TW", day(2), dec!(55)),
        ]);
        let b2 = out
            .iter()
            .find(|r| r.ticker == "B.TW" && r.date == day(2))
            .unwrap();
        assert_eq!(b2.change_price, Some(dec!(5)));
        assert_eq!(b2.change_pct, Some(dec!(10)));
    }

    #[test]
    fn gap_differences_against_last_real_close() {
        // Day 2 was dropped upstream (no close); day 3 changes vs day 1.
        let out = compute_derived(vec![
            row("A.TW", day(1), dec!(100)),
            row("A.TW", day(3), dec!(90)),
        ]);
        assert_eq!(out[1].change_price, Some(dec!(-10)));
        assert_eq!(out[1].change_pct, Some(dec!(-10)));
    }

    #[test]
    fn zero_previous_close_yields_no_pct() {
        let out = compute_derived(vec![
            row("A.TW", day(1), dec!(0)),
            row("A.TW", day(2), dec!(5)),
        ]);
        assert_eq!(out[1].change_price, Some(dec!(5)));
        assert_eq!(out[1].change_pct, None);
    }

    #[test]
    fn turnover_estimated_from_volume_when_absent() {
        let mut r = row("A.TW", day(1), dec!(100));
        r.volume = Some(30);
        let out = compute_derived(vec![r]);
        assert_eq!(out[0].turnover, Some(dec!(3000)));
    }

    #[test]
    fn authoritative_turnover_is_kept() {
        let mut r = row("A.TW", day(1), dec!(100));
        r.volume = Some(30);
        r.turnover = Some(dec!(2950));
        let out = compute_derived(vec![r]);
        assert_eq!(out[0].turnover, Some(dec!(2950)));
    }

    #[test]
    fn duplicate_dates_collapse_to_the_last_row() {
        // A live candle followed by the settled one for the same date.
        let out = compute_derived(vec![
            row("A.TW", day(1), dec!(100)),
            row("A.TW", day(2), dec!(104.5)),
            row("A.TW", day(2), dec!(105)),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].close, dec!(105));
        assert_eq!(out[1].change_price, Some(dec!(5)));
        assert_eq!(out[1].change_pct, Some(dec!(5)));
    }

    #[test]
    fn unsorted_input_is_ordered_before_differencing() {
        let out = compute_derived(vec![
            row("A.TW", day(2), dec!(110)),
            row("A.TW", day(1), dec!(100)),
        ]);
        assert_eq!(out[0].date, day(1));
        assert_eq!(out[1].change_price, Some(dec!(10)));
    }
}
