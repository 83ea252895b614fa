//! `tidy`: delete stored partitions in a date range

use anyhow::Result;
use chrono::NaiveDate;
use tamagoyaki::config::Config;
use tamagoyaki::data::DateRange;
use tamagoyaki::store::TimeSeriesStore;

pub fn run(config: &Config, symbol: &str, begin: NaiveDate, end: NaiveDate) -> Result<()> {
    let range = DateRange::new(begin, end)?;
    let store = TimeSeriesStore::new(config.candles_dir());
    let removed = store.delete_range(symbol, range)?;
    println!("{symbol} {range}: removed {removed} partition(s)");
    Ok(())
}
