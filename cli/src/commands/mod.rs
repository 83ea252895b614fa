//! Command handlers, one per CLI verb

pub mod generate;
pub mod inventory;
pub mod remove;
pub mod tidy;
pub mod update;

use chrono::NaiveDate;

/// Clap value parser for `YYYYMMDD` dates
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| "Invalid date format. Please use YYYYMMDD.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("20240101").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(parse_date("2024-01-01").is_err());
        assert!(parse_date("20240230").is_err());
        assert!(parse_date("").is_err());
    }
}
