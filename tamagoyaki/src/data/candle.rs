//! OHLCV candle data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Interval start, UTC
    pub open_time: DateTime<Utc>,
    /// Interval length in seconds
    pub interval_secs: u32,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
    /// Volume taken by buyers
    pub buy_volume: f64,
    /// Volume taken by sellers
    pub sell_volume: f64,
}

impl Candle {
    /// Create a new candle
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: String,
        open_time: DateTime<Utc>,
        interval_secs: u32,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        buy_volume: f64,
        sell_volume: f64,
    ) -> Self {
        Self {
            symbol,
            open_time,
            interval_secs,
            open,
            high,
            low,
            close,
            volume,
            buy_volume,
            sell_volume,
        }
    }

    /// Check the OHLCV invariants: aligned open time, high/low envelope,
    /// non-negative volume
    pub fn is_well_formed(&self) -> bool {
        self.is_aligned()
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
            && self.buy_volume >= 0.0
            && self.sell_volume >= 0.0
    }

    /// Whether `open_time` sits on a multiple of `interval_secs` since the
    /// Unix epoch
    pub fn is_aligned(&self) -> bool {
        self.interval_secs > 0
            && self.open_time.timestamp_subsec_nanos() == 0
            && self.open_time.timestamp() % i64::from(self.interval_secs) == 0
    }

    /// UTC calendar date this candle opens on
    pub fn date(&self) -> chrono::NaiveDate {
        self.open_time.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle_at(secs: i64) -> Candle {
        Candle::new(
            "BTCUSDT".to_string(),
            Utc.timestamp_opt(secs, 0).unwrap(),
            1,
            100.0,
            110.0,
            95.0,
            105.0,
            1000.0,
            600.0,
            400.0,
        )
    }

    #[test]
    fn test_well_formed_candle() {
        let candle = candle_at(1_704_067_200);
        assert!(candle.is_well_formed());
        assert!(candle.is_aligned());
        assert_eq!(candle.date().to_string(), "2024-01-01");
    }

    #[test]
    fn test_broken_envelope_rejected() {
        let mut candle = candle_at(1_704_067_200);
        candle.high = 90.0;
        assert!(!candle.is_well_formed());

        let mut candle = candle_at(1_704_067_200);
        candle.low = 104.0;
        assert!(!candle.is_well_formed());

        let mut candle = candle_at(1_704_067_200);
        candle.volume = -1.0;
        assert!(!candle.is_well_formed());
    }

    #[test]
    fn test_alignment() {
        let mut candle = candle_at(1_704_067_260);
        candle.interval_secs = 60;
        assert!(candle.is_aligned());

        candle.interval_secs = 7;
        assert!(!candle.is_aligned());
    }
}
