//! `update`: fetch and store native candles for each day in a range

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tamagoyaki::config::Config;
use tamagoyaki::data::DateRange;
use tamagoyaki::error::Error;
use tamagoyaki::exchange::BybitClient;
use tamagoyaki::store::TimeSeriesStore;
use tracing::{error, info};

pub async fn run(config: &Config, symbol: &str, begin: NaiveDate, end: NaiveDate) -> Result<()> {
    let range = DateRange::new(begin, end)?;
    let store = TimeSeriesStore::new(config.candles_dir());
    let client = BybitClient::with_config(
        config.base_url.clone(),
        config.retry_policy(),
        config.request_timeout(),
    );

    let mut stored = 0usize;
    let mut skipped = 0usize;
    let mut failed: Vec<NaiveDate> = Vec::new();

    for date in range.days() {
        if store.has_partition(symbol, date) {
            info!(symbol, %date, "partition already exists, skipping");
            skipped += 1;
            continue;
        }
        match client.fetch_day(symbol, date).await {
            Ok(candles) => {
                let count = store.upsert(symbol, date, &candles)?;
                info!(symbol, %date, candles = count, "day stored");
                stored += 1;
            }
            // A single day's fetch failure should not stop the range.
            Err(e @ Error::Fetch { .. }) => {
                error!(symbol, %date, error = %e, "day not stored");
                eprintln!("warning: {e}");
                failed.push(date);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "{symbol} {range}: {stored} day(s) stored, {skipped} already present, {} failed",
        failed.len()
    );
    if !failed.is_empty() {
        let days: Vec<String> = failed.iter().map(|d| d.to_string()).collect();
        bail!("{} day(s) not stored: {}", failed.len(), days.join(", "));
    }
    Ok(())
}
