//! Error types for the collector.

use std::fmt;

/// Collector error.
#[derive(Debug)]
pub enum CollectorError {
    /// Storage or provider failure.
    Data(twstock_data::DataError),
    /// Configuration failure.
    Config(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => write!(f, "Data error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

impl From<twstock_data::DataError> for CollectorError {
    fn from(err: twstock_data::DataError) -> Self {
        Self::Data(err)
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, CollectorError>;
