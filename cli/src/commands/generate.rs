//! `generate`: export a range as CSV bars at a chosen interval

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tamagoyaki::config::Config;
use tamagoyaki::data::DateRange;
use tamagoyaki::resample::resample;
use tamagoyaki::store::TimeSeriesStore;
use tracing::info;

pub fn run(
    config: &Config,
    symbol: &str,
    begin: NaiveDate,
    end: NaiveDate,
    interval_secs: u32,
    output_dir: &Path,
) -> Result<()> {
    let range = DateRange::new(begin, end)?;
    let store = TimeSeriesStore::new(config.candles_dir());

    let reader = store.read_range(symbol, range)?;
    let mut bars = resample(reader, interval_secs)?.peekable();
    if bars.peek().is_none() {
        bail!("no data stored for {symbol} in {range}");
    }

    let file_name = format!(
        "{}_{}_{}_{}.csv",
        symbol,
        begin.format("%Y%m%d"),
        end.format("%Y%m%d"),
        interval_secs
    );
    let path = output_dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(["open_time", "open", "high", "low", "close", "volume"])?;

    let mut count = 0usize;
    for bar in bars {
        let bar = bar?;
        writer.write_record([
            bar.open_time.to_rfc3339(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
        count += 1;
    }
    writer.flush()?;

    info!(symbol, %range, interval_secs, bars = count, output = %path.display(), "export written");
    println!("wrote {} bar(s) to {}", count, path.display());
    Ok(())
}
