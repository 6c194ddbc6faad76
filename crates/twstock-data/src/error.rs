//! Error types for storage and providers.

use chrono::NaiveDate;
use thiserror::Error;

/// Data layer error.
#[derive(Debug, Error)]
pub enum DataError {
    /// Read query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// Write failed with no row-level diagnosis available.
    #[error("write failed: {0}")]
    Insert(String),

    /// HTTP request to an upstream source failed.
    #[error("http request failed: {0}")]
    Http(String),

    /// Upstream payload did not match the expected shape.
    #[error("unexpected payload from {origin}: {reason}")]
    Decode { origin: String, reason: String },

    /// The storage backend rejected a batch and the offending record was
    /// recovered from its diagnostics. Nothing from the batch was committed.
    #[error(
        "batch rejected at record {index}: stock {stock_id} on {date} [{}]: {reason}",
        .field.as_deref().unwrap_or("unknown field")
    )]
    BatchRejected {
        /// 1-based position within the submitted batch.
        index: usize,
        stock_id: i32,
        date: NaiveDate,
        /// Column the backend blamed, when identifiable.
        field: Option<String>,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DataError>;
