//! `inventory`: show the stored symbols and their date ranges

use anyhow::Result;
use tamagoyaki::config::Config;
use tamagoyaki::store::TimeSeriesStore;

pub fn run(config: &Config) -> Result<()> {
    let store = TimeSeriesStore::new(config.candles_dir());
    let inventory = store.list_symbols()?;
    if inventory.is_empty() {
        println!("no symbols stored");
        return Ok(());
    }
    for entry in inventory {
        println!(
            "{}: from {} to {} ({} days)",
            entry.symbol, entry.earliest, entry.latest, entry.days
        );
    }
    Ok(())
}
