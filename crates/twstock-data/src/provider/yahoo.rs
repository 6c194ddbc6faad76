//! Yahoo Finance chart endpoint provider.
//!
//! Fetches daily candles per vendor ticker and assembles chunk requests into
//! the multi-ticker wide table the reshaper expects. Requests inside a chunk
//! are issued sequentially; the orchestrator owns all pacing between chunks.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};
use twstock_core::{FetchWindow, OhlcvCells, RawSeriesTable, SeriesRow};

use crate::error::{DataError, Result};
use crate::provider::KlineFetcher;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const UA: &str = "Mozilla/5.0 (compatible; twstock/0.3)";

/// Taiwan has no DST; a fixed +08:00 offset is sufficient for mapping
/// candle timestamps to trading dates.
const TAIPEI_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Daily kline provider backed by the Yahoo v8 chart API.
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YahooChartProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooChartProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch one ticker's daily candles for the window.
    ///
    /// An unknown or delisted ticker is an empty result, not an error.
    async fn fetch_single(
        &self,
        ticker: &str,
        window: &FetchWindow,
    ) -> Result<Vec<(NaiveDate, OhlcvCells)>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        let mut request = self
            .client
            .get(&url)
            .header(USER_AGENT, UA)
            .query(&[("interval", "1d"), ("includeAdjustedClose", "true")]);

        request = match window {
            FetchWindow::Lookback { days } => {
                let now = Utc::now().timestamp();
                let from = now - i64::from(*days) * 86_400;
                request.query(&[
                    ("period1", from.to_string()),
                    ("period2", now.to_string()),
                ])
            }
            FetchWindow::FullHistory => request.query(&[("range", "max")]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| DataError::Http(e.to_string()))?;

        // The chart API answers 404 for unknown and delisted symbols.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(ticker = ticker, "chart endpoint returned 404, treating as no data");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "chart request for {} failed with status {}",
                ticker,
                response.status()
            )));
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| DataError::Decode {
                origin: "yahoo chart".to_string(),
                reason: e.to_string(),
            })?;

        let Some(result) = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        else {
            debug!(ticker = ticker, "chart payload carried no result");
            return Ok(Vec::new());
        };

        Ok(flatten_chart(ticker, result))
    }
}

#[async_trait]
impl KlineFetcher for YahooChartProvider {
    async fn fetch(&self, tickers: &[String], window: &FetchWindow) -> Result<RawSeriesTable> {
        match tickers {
            [] => Ok(RawSeriesTable::Empty),
            [ticker] => {
                let rows = self.fetch_single(ticker, window).await?;
                Ok(RawSeriesTable::Single {
                    ticker: ticker.clone(),
                    rows,
                })
            }
            _ => {
                // Pivot per-ticker responses into one wide row per date.
                let mut by_date: BTreeMap<NaiveDate, Vec<(String, OhlcvCells)>> = BTreeMap::new();
                for ticker in tickers {
                    for (date, cells) in self.fetch_single(ticker, window).await? {
                        by_date.entry(date).or_default().push((ticker.clone(), cells));
                    }
                }

                if by_date.is_empty() {
                    return Ok(RawSeriesTable::Empty);
                }

                Ok(RawSeriesTable::Multi {
                    rows: by_date
                        .into_iter()
                        .map(|(date, cells)| SeriesRow { date, cells })
                        .collect(),
                })
            }
        }
    }
}

/// Zip the chart's parallel arrays into per-date cells.
fn flatten_chart(ticker: &str, result: ChartResult) -> Vec<(NaiveDate, OhlcvCells)> {
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|mut a| if a.is_empty() { None } else { Some(a.remove(0)) })
        .and_then(|a| a.adjclose)
        .unwrap_or_default();

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = trading_date(*ts) else {
            warn!(ticker = ticker, timestamp = ts, "unrepresentable candle timestamp");
            continue;
        };
        rows.push((
            date,
            OhlcvCells {
                open: decimal_at(&opens, i),
                high: decimal_at(&highs, i),
                low: decimal_at(&lows, i),
                close: decimal_at(&closes, i),
                adj_close: decimal_at(&adjclose, i),
                volume: volumes.get(i).copied().flatten(),
                // The chart API never carries traded value; downstream
                // estimates it from close x volume.
                turnover: None,
            },
        ));
    }
    rows
}

/// Taipei trading date for a candle timestamp.
fn trading_date(ts: i64) -> Option<NaiveDate> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)?;
    let offset = FixedOffset::east_opt(TAIPEI_UTC_OFFSET_SECS)?;
    Some(utc.with_timezone(&offset).date_naive())
}

/// `f64` cell → `Decimal`, folding float noise to four decimal places.
/// NaN and infinities collapse to `None` and never reach storage.
fn decimal_at(values: &[Option<f64>], index: usize) -> Option<Decimal> {
    values
        .get(index)
        .copied()
        .flatten()
        .and_then(Decimal::from_f64)
        .map(|d| d.round_dp(4))
}

// =============================================================================
// Chart payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    adjclose: Option<Vec<Option<f64>>>,
}
