//! End-to-end pipeline tests against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use twstock_collector::etl::{run_price_pipeline, ChunkPolicy};
use twstock_core::{
    DailyBar, FetchWindow, Market, OhlcvCells, RawSeriesTable, SeriesRow, StockRef,
};
use twstock_data::{BarSink, DataError, KlineFetcher};

/// Fetcher that replays a pre-programmed table per chunk, in call order.
struct MockFetcher {
    responses: Mutex<Vec<twstock_data::Result<RawSeriesTable>>>,
}

impl MockFetcher {
    fn new(responses: Vec<twstock_data::Result<RawSeriesTable>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl KlineFetcher for MockFetcher {
    async fn fetch(
        &self,
        _tickers: &[String],
        _window: &FetchWindow,
    ) -> twstock_data::Result<RawSeriesTable> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(RawSeriesTable::Empty)
        } else {
            responses.remove(0)
        }
    }
}

/// Sink with upsert semantics over a plain map, keyed like the real table.
#[derive(Default)]
struct MemorySink {
    rows: Mutex<HashMap<(i32, NaiveDate), DailyBar>>,
}

#[async_trait]
impl BarSink for MemorySink {
    async fn persist(&self, bars: &[DailyBar]) -> twstock_data::Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        for bar in bars {
            rows.insert((bar.stock_id, bar.date), bar.clone());
        }
        Ok(bars.len() as u64)
    }
}

/// Sink that rejects every batch.
struct FailingSink;

#[async_trait]
impl BarSink for FailingSink {
    async fn persist(&self, _bars: &[DailyBar]) -> twstock_data::Result<u64> {
        Err(DataError::Insert("numeric field overflow".to_string()))
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn cells(close: Decimal) -> OhlcvCells {
    OhlcvCells {
        open: Some(close),
        high: Some(close),
        low: Some(close),
        close: Some(close),
        adj_close: Some(close),
        volume: Some(1_000),
        turnover: None,
    }
}

fn refs() -> Vec<StockRef> {
    vec![
        StockRef {
            id: 1,
            code: "2330".to_string(),
            market: Market::Listed,
        },
        StockRef {
            id: 2,
            code: "6488".to_string(),
            market: Market::Otc,
        },
    ]
}

fn two_ticker_table() -> RawSeriesTable {
    RawSeriesTable::Multi {
        rows: vec![
            SeriesRow {
                date: day(1),
                cells: vec![
                    ("2330.TW".to_string(), cells(dec!(593))),
                    ("6488.TWO".to_string(), cells(dec!(1500))),
                ],
            },
            SeriesRow {
                date: day(2),
                cells: vec![
                    ("2330.TW".to_string(), cells(dec!(600))),
                    ("6488.TWO".to_string(), cells(dec!(1480))),
                ],
            },
        ],
    }
}

fn policy(chunk_size: usize) -> ChunkPolicy {
    ChunkPolicy {
        chunk_size,
        window: FetchWindow::Lookback { days: 4 },
        pause: Duration::ZERO,
    }
}

#[tokio::test]
async fn pipeline_persists_both_series_with_changes() {
    let fetcher = MockFetcher::new(vec![Ok(two_ticker_table())]);
    let sink = MemorySink::default();

    let stats = run_price_pipeline(&fetcher, &sink, &refs(), &policy(100))
        .await
        .unwrap();

    assert_eq!(stats.chunks_attempted, 1);
    assert_eq!(stats.chunks_failed, 0);
    assert_eq!(stats.rows_written, 4);

    let rows = sink.rows.lock().unwrap();
    let tsmc_day2 = rows.get(&(1, day(2))).unwrap();
    assert_eq!(tsmc_day2.change_price, dec!(7));
    let gw_day2 = rows.get(&(2, day(2))).unwrap();
    assert_eq!(gw_day2.change_price, dec!(-20));
    // First bar of each series lands with the defined zero-change state.
    assert_eq!(rows.get(&(1, day(1))).unwrap().change_price, Decimal::ZERO);
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let sink = MemorySink::default();
    for _ in 0..2 {
        let fetcher = MockFetcher::new(vec![Ok(two_ticker_table())]);
        run_price_pipeline(&fetcher, &sink, &refs(), &policy(100))
            .await
            .unwrap();
    }
    let rows = sink.rows.lock().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows.get(&(1, day(2))).unwrap().close, dec!(600));
}

#[tokio::test]
async fn unmapped_ticker_is_dropped_and_counted() {
    let table = RawSeriesTable::Single {
        ticker: "9999.TW".to_string(),
        rows: vec![(day(1), cells(dec!(10)))],
    };
    let fetcher = MockFetcher::new(vec![Ok(table)]);
    let sink = MemorySink::default();

    let stats = run_price_pipeline(&fetcher, &sink, &refs(), &policy(100))
        .await
        .unwrap();

    assert_eq!(stats.rows_unmapped, 1);
    assert_eq!(stats.rows_written, 0);
    assert!(sink.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_fetch_is_not_an_error() {
    let fetcher = MockFetcher::new(vec![Ok(RawSeriesTable::Empty)]);
    let sink = MemorySink::default();

    let stats = run_price_pipeline(&fetcher, &sink, &refs(), &policy(100))
        .await
        .unwrap();

    assert_eq!(stats.empty_chunks, 1);
    assert_eq!(stats.chunks_failed, 0);
    assert_eq!(stats.rows_written, 0);
}

#[tokio::test]
async fn failed_chunk_does_not_abort_the_run() {
    // Chunk size 1 → one chunk per ticker; the first fetch fails.
    let fetcher = MockFetcher::new(vec![
        Err(DataError::Http("connection reset".to_string())),
        Ok(RawSeriesTable::Single {
            ticker: "6488.TWO".to_string(),
            rows: vec![(day(1), cells(dec!(1500)))],
        }),
    ]);
    let sink = MemorySink::default();

    let stats = run_price_pipeline(&fetcher, &sink, &refs(), &policy(1))
        .await
        .unwrap();

    assert_eq!(stats.chunks_attempted, 2);
    assert_eq!(stats.chunks_failed, 1);
    assert_eq!(stats.rows_written, 1);
    assert!(sink.rows.lock().unwrap().contains_key(&(2, day(1))));
}

#[tokio::test]
async fn persist_failure_is_chunk_local() {
    let fetcher = MockFetcher::new(vec![Ok(two_ticker_table())]);
    let sink = FailingSink;

    let stats = run_price_pipeline(&fetcher, &sink, &refs(), &policy(100))
        .await
        .unwrap();

    assert_eq!(stats.chunks_attempted, 1);
    assert_eq!(stats.chunks_failed, 1);
    assert_eq!(stats.rows_written, 0);
}
