//! Batch upsert persistence for daily price bars.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use tracing::{debug, info};
use twstock_core::DailyBar;

use crate::error::{DataError, Result};
use crate::store::diagnostics::{RowFault, RowFaultDiagnostics, TextRowFaultDiagnostics};

/// Rows per INSERT statement. One logical batch may span several statements,
/// all inside one transaction.
const STATEMENT_CHUNK: usize = 500;

/// Persistence seam the pipeline writes through.
///
/// [`PriceStore`] is the production implementation; tests substitute an
/// in-memory sink.
#[async_trait]
pub trait BarSink: Send + Sync {
    /// Persist a batch of bars with merge-on-conflict semantics.
    /// An empty batch is a successful no-op.
    async fn persist(&self, bars: &[DailyBar]) -> Result<u64>;
}

/// Writes assembled bars into `daily_prices` with merge semantics.
pub struct PriceStore {
    pool: PgPool,
    diagnostics: Box<dyn RowFaultDiagnostics>,
}

impl PriceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            diagnostics: Box::new(TextRowFaultDiagnostics),
        }
    }

    /// Replace the row-fault diagnostics adapter, for backends that report
    /// structured row-level diagnostics instead of error text.
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn RowFaultDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Upsert a batch of daily bars keyed on `(stock_id, date)`.
    ///
    /// The whole batch commits atomically; existing rows have every non-key
    /// column overwritten, so re-running the same batch is idempotent. On a
    /// backend rejection the transaction is rolled back and, when the
    /// backend's diagnostics identify the offending row, the error names the
    /// exact record and field that broke the batch.
    pub async fn upsert_daily_bars(&self, bars: &[DailyBar]) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::Insert(e.to_string()))?;

        let mut affected = 0u64;

        for (chunk_no, chunk) in bars.chunks(STATEMENT_CHUNK).enumerate() {
            let mut query_builder = QueryBuilder::new(
                "INSERT INTO daily_prices \
                 (stock_id, date, open, high, low, close, adj_close, \
                  volume, turnover, change_price, change_pct) ",
            );

            query_builder.push_values(chunk, |mut b, bar| {
                b.push_bind(bar.stock_id)
                    .push_bind(bar.date)
                    .push_bind(bar.open)
                    .push_bind(bar.high)
                    .push_bind(bar.low)
                    .push_bind(bar.close)
                    .push_bind(bar.adj_close)
                    .push_bind(bar.volume)
                    .push_bind(bar.turnover)
                    .push_bind(bar.change_price)
                    .push_bind(bar.change_pct);
            });

            query_builder.push(
                " ON CONFLICT (stock_id, date) DO UPDATE SET \
                 open = EXCLUDED.open, \
                 high = EXCLUDED.high, \
                 low = EXCLUDED.low, \
                 close = EXCLUDED.close, \
                 adj_close = EXCLUDED.adj_close, \
                 volume = EXCLUDED.volume, \
                 turnover = EXCLUDED.turnover, \
                 change_price = EXCLUDED.change_price, \
                 change_pct = EXCLUDED.change_pct",
            );

            match query_builder.build().execute(&mut *tx).await {
                Ok(result) => affected += result.rows_affected(),
                Err(e) => {
                    tx.rollback().await.ok();
                    let fault = self.diagnostics.locate(&e);
                    return Err(reject_batch(
                        bars,
                        chunk_no * STATEMENT_CHUNK,
                        fault,
                        e.to_string(),
                    ));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DataError::Insert(e.to_string()))?;

        debug!(
            rows = bars.len(),
            affected = affected,
            "daily price batch upserted"
        );

        Ok(affected)
    }
}

#[async_trait]
impl BarSink for PriceStore {
    async fn persist(&self, bars: &[DailyBar]) -> Result<u64> {
        self.upsert_daily_bars(bars).await
    }
}

/// Build the batch-failure error, pinning the offending record when the
/// backend's diagnostics located one.
///
/// The fault row is 1-based and relative to the failed statement;
/// `chunk_offset` shifts it back into the caller's batch.
fn reject_batch(
    bars: &[DailyBar],
    chunk_offset: usize,
    fault: Option<RowFault>,
    reason: String,
) -> DataError {
    let Some(fault) = fault else {
        return DataError::Insert(reason);
    };

    let index = chunk_offset + fault.row;
    let Some(bar) = bars.get(index - 1) else {
        // Backend pointed outside the batch; keep the raw error.
        return DataError::Insert(reason);
    };

    info!(
        index = index,
        stock_id = bar.stock_id,
        date = %bar.date,
        field = fault.column.as_deref().unwrap_or("?"),
        "offending record recovered from batch diagnostics"
    );

    DataError::BatchRejected {
        index,
        stock_id: bar.stock_id,
        date: bar.date,
        field: fault.column,
        reason,
    }
}
