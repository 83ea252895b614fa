//! Inclusive UTC date ranges

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};
use std::fmt;

/// An inclusive range of UTC calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end < start` before any I/O happens
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// A range covering a single day
    pub fn single(date: NaiveDate) -> Self {
        DateRange {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the range, at least 1
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterate the days in ascending order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::new(date("2024-01-03"), date("2024-01-01")).unwrap_err();
        assert!(matches!(err, Error::InvalidDateRange { .. }));
    }

    #[test]
    fn test_day_iteration() {
        let range = DateRange::new(date("2024-01-01"), date("2024-01-03")).unwrap();
        assert_eq!(range.num_days(), 3);
        let days: Vec<_> = range.days().collect();
        assert_eq!(
            days,
            vec![date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
        assert!(range.contains(date("2024-01-02")));
        assert!(!range.contains(date("2024-01-04")));
    }

    #[test]
    fn test_single_day() {
        let range = DateRange::single(date("2024-02-29"));
        assert_eq!(range.num_days(), 1);
        assert_eq!(range.start(), range.end());
    }
}
