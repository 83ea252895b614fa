//! Bar interval handling

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Finest granularity the store persists, in seconds
pub const NATIVE_INTERVAL_SECS: u32 = 1;

/// A candle interval in whole seconds
///
/// Construction through [`Interval::from_secs`] guarantees the value is a
/// positive multiple of the native interval, so every `Interval` is a valid
/// resample target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval(u32);

impl Interval {
    /// The store's native interval
    pub const NATIVE: Interval = Interval(NATIVE_INTERVAL_SECS);

    /// Validate a requested interval in seconds
    pub fn from_secs(secs: u32) -> Result<Self> {
        if secs < NATIVE_INTERVAL_SECS || secs % NATIVE_INTERVAL_SECS != 0 {
            return Err(Error::InvalidInterval {
                requested: secs,
                native: NATIVE_INTERVAL_SECS,
            });
        }
        Ok(Interval(secs))
    }

    /// Interval length in seconds
    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Bucket index of a timestamp: epoch seconds divided by the interval,
    /// rounded toward negative infinity
    pub fn bucket_index(self, time: DateTime<Utc>) -> i64 {
        time.timestamp().div_euclid(i64::from(self.0))
    }

    /// Align a whole-second timestamp down to its interval boundary
    pub fn floor(self, time: DateTime<Utc>) -> DateTime<Utc> {
        time - Duration::seconds(time.timestamp().rem_euclid(i64::from(self.0)))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_interval_rejected() {
        assert!(matches!(
            Interval::from_secs(0),
            Err(Error::InvalidInterval { requested: 0, .. })
        ));
    }

    #[test]
    fn test_valid_intervals() {
        assert_eq!(Interval::from_secs(1).unwrap(), Interval::NATIVE);
        assert_eq!(Interval::from_secs(60).unwrap().as_secs(), 60);
        assert_eq!(Interval::from_secs(86400).unwrap().to_string(), "86400s");
    }

    #[test]
    fn test_floor_alignment() {
        let interval = Interval::from_secs(60).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 45).unwrap();
        let floored = interval.floor(t);
        assert_eq!(floored, Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap());
        assert_eq!(interval.floor(floored), floored);
        assert_eq!(interval.bucket_index(t), interval.bucket_index(floored));
        assert_ne!(
            interval.bucket_index(t),
            interval.bucket_index(t + Duration::seconds(15))
        );
    }
}
