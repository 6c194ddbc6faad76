//! Run statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Outcome counters for one collector run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Chunks the orchestrator attempted.
    pub chunks_attempted: usize,
    /// Chunks that failed (fetch or persist); the run continued past them.
    pub chunks_failed: usize,
    /// Chunks whose fetch produced no data at all.
    pub empty_chunks: usize,
    /// Rows written (inserted or overwritten) by the upsert store.
    pub rows_written: u64,
    /// Rows dropped because their vendor ticker had no mapping entry.
    pub rows_unmapped: usize,
    /// Wall-clock time for the run.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of attempted chunks that completed, in percent.
    pub fn chunk_success_rate(&self) -> f64 {
        if self.chunks_attempted == 0 {
            0.0
        } else {
            let ok = self.chunks_attempted - self.chunks_failed;
            (ok as f64 / self.chunks_attempted as f64) * 100.0
        }
    }

    /// Log a one-line summary of the run.
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            chunks_attempted = self.chunks_attempted,
            chunks_failed = self.chunks_failed,
            empty_chunks = self.empty_chunks,
            rows_written = self.rows_written,
            rows_unmapped = self.rows_unmapped,
            success_rate = format!("{:.1}%", self.chunk_success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_zero_chunks() {
        assert_eq!(CollectionStats::new().chunk_success_rate(), 0.0);
    }

    #[test]
    fn success_rate_counts_failures() {
        let stats = CollectionStats {
            chunks_attempted: 4,
            chunks_failed: 1,
            ..Default::default()
        };
        assert_eq!(stats.chunk_success_rate(), 75.0);
    }
}
