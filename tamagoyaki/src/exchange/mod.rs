//! Exchange integration
//!
//! Downloads Bybit's public daily trade archives and turns them into
//! native-interval candles.

pub mod client;
pub mod retry;
pub mod trade;

pub use client::*;
pub use retry::*;
pub use trade::*;
