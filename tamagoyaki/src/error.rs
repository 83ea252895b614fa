//! Error types shared across the crate

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the store, resampler and exchange client
#[derive(Debug, Error)]
pub enum Error {
    /// Network or API failure while fetching a day of data
    #[error("failed to fetch {symbol} for {date}: {message}")]
    Fetch {
        symbol: String,
        date: NaiveDate,
        message: String,
        /// Transport errors and 5xx responses may be retried; 404 may not
        retryable: bool,
    },

    /// Disk or permission failure, fatal for the affected operation
    #[error("store I/O error at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored partition could not be decoded
    #[error("corrupt partition {path}: {message}")]
    Partition { path: PathBuf, message: String },

    /// No data stored for the requested symbol
    #[error("no data stored for symbol {0}")]
    SymbolNotFound(String),

    /// Resample target is not a positive multiple of the native interval
    #[error("invalid interval {requested}s: must be a positive multiple of the native {native}s interval")]
    InvalidInterval { requested: u32, native: u32 },

    /// End date before start date
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl Error {
    /// Whether a failed fetch is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Fetch { retryable: true, .. })
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::StoreIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn partition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Partition {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
