//! Environment-variable based configuration.

use std::time::Duration;

use crate::error::CollectorError;
use crate::Result;

/// Full collector configuration.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Database URL.
    pub database_url: String,
    /// Pool size; one connection per logical unit of work is enough, the
    /// rest is headroom.
    pub db_max_connections: u32,
    /// Incremental daily-update settings.
    pub incremental: IncrementalConfig,
    /// Full-history backfill settings.
    pub backfill: BackfillConfig,
}

/// Incremental mode: small trailing window, big chunks, no pacing.
#[derive(Debug, Clone)]
pub struct IncrementalConfig {
    /// Tickers per fetch chunk.
    pub chunk_size: usize,
    /// Trailing calendar days to fetch. Two is the mathematical minimum to
    /// difference one day's change; the default of four rides over weekends
    /// and holidays.
    pub lookback_days: u32,
}

/// Backfill mode: maximal window, small chunks, mandatory pacing.
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    /// Tickers per fetch chunk.
    pub chunk_size: usize,
    /// Pause between chunks, to stay under the vendor's rate limits.
    pub pause_secs: u64,
}

impl CollectorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| CollectorError::Config("DATABASE_URL is not set".to_string()))?;

        Ok(Self {
            database_url,
            db_max_connections: env_var_parse("DB_MAX_CONNECTIONS", 5),
            incremental: IncrementalConfig {
                chunk_size: env_var_parse("INCREMENTAL_CHUNK_SIZE", 100),
                lookback_days: env_var_parse("INCREMENTAL_LOOKBACK_DAYS", 4),
            },
            backfill: BackfillConfig {
                chunk_size: env_var_parse("BACKFILL_CHUNK_SIZE", 10),
                pause_secs: env_var_parse("BACKFILL_PAUSE_SECS", 2),
            },
        })
    }
}

impl BackfillConfig {
    /// Inter-chunk pause as a Duration.
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }
}

/// Parse an environment variable, falling back to a default.
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
