//! `remove`: delete all stored data for a symbol

use anyhow::Result;
use tamagoyaki::config::Config;
use tamagoyaki::store::TimeSeriesStore;

pub fn run(config: &Config, symbol: &str) -> Result<()> {
    let store = TimeSeriesStore::new(config.candles_dir());
    if store.delete_symbol(symbol)? {
        println!("{symbol}: removed");
    } else {
        println!("{symbol}: nothing stored");
    }
    Ok(())
}
