//! Chunked price-collection orchestration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use twstock_core::{FetchWindow, StockRef};
use twstock_data::{BarSink, DataError, KlineFetcher};

use crate::config::{BackfillConfig, IncrementalConfig};
use crate::stats::CollectionStats;
use crate::Result;

use super::{assemble, build_ticker_map, compute_derived, reshape};

/// How a run walks the ticker universe.
#[derive(Debug, Clone)]
pub struct ChunkPolicy {
    /// Tickers per fetch chunk.
    pub chunk_size: usize,
    /// Fetch window passed to the vendor.
    pub window: FetchWindow,
    /// Pause between chunks. Zero means no pacing.
    pub pause: Duration,
}

impl ChunkPolicy {
    /// Daily incremental run: short trailing window, large chunks, no pacing.
    ///
    /// The lookback is clamped to at least two days so the first row of each
    /// window still has a previous close to difference against.
    pub fn incremental(config: &IncrementalConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            window: FetchWindow::Lookback {
                days: config.lookback_days.max(2),
            },
            pause: Duration::ZERO,
        }
    }

    /// Full-history backfill: maximal window, small chunks, mandatory pacing.
    pub fn backfill(config: &BackfillConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            window: FetchWindow::FullHistory,
            pause: config.pause(),
        }
    }
}

/// Run the price pipeline over the whole registry in chunks.
///
/// Each chunk is fetched, reshaped, derived, assembled and persisted on its
/// own; a failing chunk is logged and counted, and the run moves on. Only a
/// configuration-level problem aborts the whole run.
pub async fn run_price_pipeline(
    fetcher: &dyn KlineFetcher,
    sink: &dyn BarSink,
    refs: &[StockRef],
    policy: &ChunkPolicy,
) -> Result<CollectionStats> {
    let started = Instant::now();
    let mut stats = CollectionStats::new();

    let ticker_map = build_ticker_map(refs);
    let tickers: Vec<String> = refs
        .iter()
        .map(|r| r.market.vendor_ticker(&r.code))
        .collect();

    let total_chunks = tickers.chunks(policy.chunk_size).count();
    info!(
        tickers = tickers.len(),
        chunks = total_chunks,
        chunk_size = policy.chunk_size,
        "starting price collection"
    );

    for (chunk_no, chunk) in tickers.chunks(policy.chunk_size).enumerate() {
        if chunk_no > 0 && !policy.pause.is_zero() {
            tokio::time::sleep(policy.pause).await;
        }
        stats.chunks_attempted += 1;

        let table = match fetcher.fetch(chunk, &policy.window).await {
            Ok(table) => table,
            Err(e) => {
                warn!(chunk = chunk_no + 1, error = %e, "chunk fetch failed");
                stats.chunks_failed += 1;
                continue;
            }
        };
        if table.is_empty() {
            stats.empty_chunks += 1;
            continue;
        }

        let rows = reshape(table);
        let derived = compute_derived(rows);
        let outcome = assemble(derived, &ticker_map);
        stats.rows_unmapped += outcome.unmapped;
        if outcome.bars.is_empty() {
            continue;
        }

        match sink.persist(&outcome.bars).await {
            Ok(written) => {
                stats.rows_written += written;
                info!(
                    chunk = chunk_no + 1,
                    of = total_chunks,
                    rows = written,
                    "chunk persisted"
                );
            }
            Err(DataError::BatchRejected {
                index,
                stock_id,
                date,
                field,
                reason,
            }) => {
                warn!(
                    chunk = chunk_no + 1,
                    index,
                    stock_id,
                    date = %date,
                    field = field.as_deref().unwrap_or("unknown"),
                    reason = %reason,
                    "chunk rejected by store"
                );
                stats.chunks_failed += 1;
            }
            Err(e) => {
                warn!(chunk = chunk_no + 1, error = %e, "chunk persist failed");
                stats.chunks_failed += 1;
            }
        }
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}
