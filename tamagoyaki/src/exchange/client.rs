//! Bybit public archive client
//!
//! Bybit publishes one gzip-compressed CSV of raw trades per symbol per UTC
//! day at `https://public.bybit.com/trading/<SYMBOL>/<SYMBOL><YYYY-MM-DD>.csv.gz`.
//! The client downloads a day's archive, parses the tape and hands back
//! native 1-second candles.

use crate::data::Candle;
use crate::error::{Error, Result};
use crate::exchange::retry::RetryPolicy;
use crate::exchange::trade::{aggregate_trades, TradeRecord};
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{info, warn};

/// Public trade archive base URL
pub const DEFAULT_BASE_URL: &str = "https://public.bybit.com/trading";

/// Downloads daily trade archives and aggregates them to native candles
#[derive(Debug, Clone)]
pub struct BybitClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    request_timeout: Duration,
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BybitClient {
    pub fn new() -> Self {
        Self::with_config(
            DEFAULT_BASE_URL.to_string(),
            RetryPolicy::default(),
            Duration::from_secs(30),
        )
    }

    /// Client with explicit base URL, retry policy and per-attempt timeout
    pub fn with_config(base_url: String, retry: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
            request_timeout,
        }
    }

    fn archive_url(&self, symbol: &str, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}{}.csv.gz",
            self.base_url,
            symbol,
            symbol,
            date.format("%Y-%m-%d")
        )
    }

    /// Fetch one day of native candles, retrying transient failures
    ///
    /// Retries are bounded by the client's [`RetryPolicy`] and each one is
    /// logged; a 404 (day not published, or unknown symbol) fails
    /// immediately.
    pub async fn fetch_day(&self, symbol: &str, date: NaiveDate) -> Result<Vec<Candle>> {
        let mut attempt = 1;
        loop {
            match self.fetch_day_once(symbol, date).await {
                Ok(candles) => {
                    info!(symbol, %date, candles = candles.len(), "day fetched");
                    return Ok(candles);
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt);
                    warn!(symbol, %date, attempt, error = %e, "fetch failed, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_day_once(&self, symbol: &str, date: NaiveDate) -> Result<Vec<Candle>> {
        let url = self.archive_url(symbol, date);
        let response = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| fetch_error(symbol, date, e.to_string(), true))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(fetch_error(
                symbol,
                date,
                "archive not published (HTTP 404)".to_string(),
                false,
            ));
        }
        if !status.is_success() {
            return Err(fetch_error(
                symbol,
                date,
                format!("HTTP {status}"),
                status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(symbol, date, e.to_string(), true))?;

        let mut reader = csv::Reader::from_reader(GzDecoder::new(bytes.as_ref()));
        let mut trades: Vec<TradeRecord> = Vec::new();
        for row in reader.deserialize() {
            let trade =
                row.map_err(|e| fetch_error(symbol, date, format!("malformed archive: {e}"), false))?;
            trades.push(trade);
        }

        Ok(aggregate_trades(symbol, trades))
    }
}

fn fetch_error(symbol: &str, date: NaiveDate, message: String, retryable: bool) -> Error {
    Error::Fetch {
        symbol: symbol.to_string(),
        date,
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_url() {
        let client = BybitClient::with_config(
            "https://public.bybit.com/trading/".to_string(),
            RetryPolicy::default(),
            Duration::from_secs(30),
        );
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            client.archive_url("BTCUSDT", date),
            "https://public.bybit.com/trading/BTCUSDT/BTCUSDT2024-01-01.csv.gz"
        );
    }
}
