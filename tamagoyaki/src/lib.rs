//! Tamagoyaki: a local candlestick data manager
//!
//! This crate is the library behind the `tamagoyaki` CLI. It keeps a
//! per-user store of 1-second crypto candles, one gzip-CSV partition per
//! (symbol, UTC day), fed from Bybit's public trade archives, and rebuilds
//! coarser bars from it on demand.
//!
//! # Features
//!
//! - **Data Model**: candles, intervals and date ranges with their
//!   validation rules
//! - **Time-Series Store**: idempotent per-day partitions with atomic
//!   writes, range reads, inventory and deletion
//! - **Resampler**: lazy aggregation of native candles into any coarser
//!   epoch-aligned interval
//! - **Exchange Client**: daily trade-archive download with bounded retry,
//!   aggregated to native candles
//!
//! # Example
//!
//! ```no_run
//! use tamagoyaki::prelude::*;
//!
//! fn export(store: &TimeSeriesStore, range: DateRange) -> Result<Vec<Candle>> {
//!     let reader = store.read_range("BTCUSDT", range)?;
//!     resample(reader, 60)?.collect()
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod exchange;
pub mod resample;
pub mod store;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::data::*;
    pub use crate::error::{Error, Result};
    pub use crate::exchange::*;
    pub use crate::resample::*;
    pub use crate::store::*;
}

pub use error::{Error, Result};
