//! Configuration
//!
//! All state lives under one per-user data directory (default
//! `$HOME/.tamagoyaki`); deleting it fully resets the tool. The directory is
//! injected everywhere as an explicit value so tests can point it at a
//! temporary location.

use crate::exchange::{RetryPolicy, DEFAULT_BASE_URL};
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;

pub struct Config {
    /// Root data directory, holds `candles/` and `log/`
    pub data_dir: PathBuf,
    /// Trade archive base URL
    pub base_url: String,
    /// Fetch attempts per day, including the first
    pub max_retries: u32,
    /// Backoff after the first failed attempt, in milliseconds
    pub retry_delay_ms: u64,
    /// Per-attempt HTTP timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let data_dir = match std::env::var("TAMAGOYAKI_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => home::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine the home directory; set TAMAGOYAKI_DIR"))?
                .join(".tamagoyaki"),
        };

        Ok(Config {
            data_dir,
            base_url: std::env::var("TAMAGOYAKI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            max_retries: std::env::var("TAMAGOYAKI_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            retry_delay_ms: std::env::var("TAMAGOYAKI_RETRY_DELAY_MS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
            request_timeout_secs: std::env::var("TAMAGOYAKI_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    /// Partition tree root
    pub fn candles_dir(&self) -> PathBuf {
        self.data_dir.join("candles")
    }

    /// Log directory, holds `app.log`
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("log")
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
