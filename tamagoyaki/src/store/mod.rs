//! Time-series store
//!
//! Durable, idempotent persistence of per-day candle partitions plus their
//! enumeration and deletion.

pub mod partition;
pub mod timeseries;

pub use timeseries::*;
