//! Durable per-day candle partitions
//!
//! `TimeSeriesStore` owns every file under its root directory: one
//! gzip-compressed CSV partition per (symbol, UTC day), laid out as
//! `<root>/<SYMBOL>/<YYYY-MM-DD>.csv.gz`. All writes go through a temp file
//! followed by an atomic rename, so a concurrent reader or a crash mid-write
//! never observes a partial partition.

use crate::data::{Candle, DateRange, NATIVE_INTERVAL_SECS};
use crate::error::{Error, Result};
use crate::store::partition;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inventory entry for one stored symbol
///
/// Derived from the partition files on every call, never stored itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInventory {
    pub symbol: String,
    /// Earliest stored partition date
    pub earliest: NaiveDate,
    /// Latest stored partition date
    pub latest: NaiveDate,
    /// Number of stored partitions
    pub days: usize,
}

/// File-backed candle store, one partition per (symbol, UTC day)
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    root: PathBuf,
}

impl TimeSeriesStore {
    /// Open a store rooted at the given directory
    ///
    /// The directory is created lazily on first write, so opening a store on
    /// a fresh machine is free.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.root.join(symbol)
    }

    fn partition_path(&self, symbol: &str, date: NaiveDate) -> PathBuf {
        self.symbol_dir(symbol).join(partition::file_name(date))
    }

    /// Whether a partition exists for the given day
    pub fn has_partition(&self, symbol: &str, date: NaiveDate) -> bool {
        self.partition_path(symbol, date).is_file()
    }

    /// Write candles into the (symbol, date) partition
    ///
    /// Merges with any existing partition content by `open_time`, incoming
    /// data winning ties, so re-running an ingest is idempotent and a
    /// partial partition can be completed later. Returns the number of
    /// candles in the partition after the merge.
    pub fn upsert(&self, symbol: &str, date: NaiveDate, candles: &[Candle]) -> Result<usize> {
        let path = self.partition_path(symbol, date);
        for candle in candles {
            if candle.interval_secs != NATIVE_INTERVAL_SECS || !candle.is_well_formed() {
                return Err(Error::partition(
                    &path,
                    format!("refusing to store malformed candle at {}", candle.open_time),
                ));
            }
            if candle.date() != date {
                return Err(Error::partition(
                    &path,
                    format!("candle at {} is outside partition day {}", candle.open_time, date),
                ));
            }
        }

        let mut merged: BTreeMap<i64, Candle> = BTreeMap::new();
        if path.is_file() {
            for existing in self.read_partition(symbol, &path)? {
                merged.insert(existing.open_time.timestamp(), existing);
            }
        }
        for candle in candles {
            merged.insert(candle.open_time.timestamp(), candle.clone());
        }

        let ordered: Vec<Candle> = merged.into_values().collect();
        let bytes = partition::encode(&path, &ordered)?;
        self.write_atomic(&path, &bytes)?;
        debug!(symbol, %date, candles = ordered.len(), "partition written");
        Ok(ordered.len())
    }

    /// Lazy ascending iterator over all stored candles in the date range
    ///
    /// Missing partitions inside the range are skipped silently; the
    /// resulting sequence may have gaps. Fails with `SymbolNotFound` only
    /// when the symbol has no partition at all.
    pub fn read_range(&self, symbol: &str, range: DateRange) -> Result<RangeReader> {
        if !self.symbol_dir(symbol).is_dir() {
            return Err(Error::SymbolNotFound(symbol.to_string()));
        }
        Ok(RangeReader {
            store: self.clone(),
            symbol: symbol.to_string(),
            days: range.days().collect(),
            next_day: 0,
            current: Vec::new().into_iter(),
            failed: false,
        })
    }

    /// Enumerate stored symbols with their earliest/latest dates
    pub fn list_symbols(&self) -> Result<Vec<SymbolInventory>> {
        let mut inventory = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(inventory),
            Err(e) => return Err(Error::store_io(&self.root, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| Error::store_io(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            let dates = self.partition_dates(&entry.path())?;
            if let (Some(&earliest), Some(&latest)) = (dates.first(), dates.last()) {
                inventory.push(SymbolInventory {
                    symbol: name,
                    earliest,
                    latest,
                    days: dates.len(),
                });
            }
        }
        inventory.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(inventory)
    }

    /// Delete all partitions dated within the range
    ///
    /// Deleting a missing partition is a no-op. Returns the number of
    /// partitions actually removed. The symbol directory itself is removed
    /// once its last partition is gone.
    pub fn delete_range(&self, symbol: &str, range: DateRange) -> Result<usize> {
        let mut removed = 0;
        for date in range.days() {
            let path = self.partition_path(symbol, date);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::store_io(&path, e)),
            }
        }

        let dir = self.symbol_dir(symbol);
        if removed > 0 && self.partition_dates(&dir).map_or(false, |d| d.is_empty()) {
            let _ = fs::remove_dir(&dir);
        }
        if removed > 0 {
            info!(symbol, %range, removed, "partitions deleted");
        }
        Ok(removed)
    }

    /// Delete every partition for the symbol
    ///
    /// Idempotent: returns `false` when nothing was stored.
    pub fn delete_symbol(&self, symbol: &str) -> Result<bool> {
        let dir = self.symbol_dir(symbol);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!(symbol, "symbol removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::store_io(&dir, e)),
        }
    }

    fn read_partition(&self, symbol: &str, path: &Path) -> Result<Vec<Candle>> {
        let bytes = fs::read(path).map_err(|e| Error::store_io(path, e))?;
        partition::decode(path, symbol, &bytes)
    }

    /// Ascending partition dates found in a symbol directory
    fn partition_dates(&self, dir: &Path) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(dates),
            Err(e) => return Err(Error::store_io(dir, e)),
        };
        for entry in entries {
            let entry = entry.map_err(|e| Error::store_io(dir, e))?;
            if let Some(date) = partition::parse_file_name(&entry.file_name().to_string_lossy()) {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::partition(path, "partition path has no parent"))?;
        fs::create_dir_all(dir).map_err(|e| Error::store_io(dir, e))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if let Err(e) = fs::write(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::store_io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::store_io(path, e));
        }
        Ok(())
    }
}

/// Iterator returned by [`TimeSeriesStore::read_range`]
///
/// Loads one partition at a time, in date order. Restartable: calling
/// `read_range` again yields a fresh, independent pass over the store.
#[derive(Debug)]
pub struct RangeReader {
    store: TimeSeriesStore,
    symbol: String,
    days: Vec<NaiveDate>,
    next_day: usize,
    current: std::vec::IntoIter<Candle>,
    failed: bool,
}

impl Iterator for RangeReader {
    type Item = Result<Candle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(candle) = self.current.next() {
                return Some(Ok(candle));
            }
            let date = *self.days.get(self.next_day)?;
            self.next_day += 1;
            let path = self.store.partition_path(&self.symbol, date);
            if !path.is_file() {
                continue;
            }
            match self.store.read_partition(&self.symbol, &path) {
                Ok(candles) => self.current = candles.into_iter(),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn candle(secs: i64, close: f64) -> Candle {
        Candle::new(
            "BTCUSDT".to_string(),
            Utc.timestamp_opt(secs, 0).unwrap(),
            NATIVE_INTERVAL_SECS,
            close - 1.0,
            close + 2.0,
            close - 2.0,
            close,
            10.0,
            6.0,
            4.0,
        )
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // 2024-01-01T00:00:00Z
    const DAY1: i64 = 1_704_067_200;

    #[test]
    fn test_upsert_and_read_back() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        let candles = vec![candle(DAY1, 100.0), candle(DAY1 + 1, 101.0)];

        let count = store.upsert("BTCUSDT", date("2024-01-01"), &candles).unwrap();
        assert_eq!(count, 2);
        assert!(store.has_partition("BTCUSDT", date("2024-01-01")));

        let read: Vec<Candle> = store
            .read_range("BTCUSDT", DateRange::single(date("2024-01-01")))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read, candles);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        let candles = vec![candle(DAY1, 100.0), candle(DAY1 + 1, 101.0)];

        store.upsert("BTCUSDT", date("2024-01-01"), &candles).unwrap();
        let first = fs::read(store.partition_path("BTCUSDT", date("2024-01-01"))).unwrap();
        store.upsert("BTCUSDT", date("2024-01-01"), &candles).unwrap();
        let second = fs::read(store.partition_path("BTCUSDT", date("2024-01-01"))).unwrap();

        let path = store.partition_path("BTCUSDT", date("2024-01-01"));
        assert_eq!(
            partition::decode(&path, "BTCUSDT", &first).unwrap(),
            partition::decode(&path, "BTCUSDT", &second).unwrap()
        );
    }

    #[test]
    fn test_upsert_merges_and_new_data_wins() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());

        store
            .upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 100.0), candle(DAY1 + 2, 102.0)])
            .unwrap();
        // Correction for DAY1 plus a fill for the gap second.
        let count = store
            .upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 99.0), candle(DAY1 + 1, 101.0)])
            .unwrap();
        assert_eq!(count, 3);

        let read: Vec<Candle> = store
            .read_range("BTCUSDT", DateRange::single(date("2024-01-01")))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read[0].close, 99.0);
        assert_eq!(read[1].close, 101.0);
        assert_eq!(read[2].close, 102.0);
    }

    #[test]
    fn test_upsert_rejects_candle_outside_day() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        let err = store
            .upsert("BTCUSDT", date("2024-01-02"), &[candle(DAY1, 100.0)])
            .unwrap_err();
        assert!(matches!(err, Error::Partition { .. }));
    }

    #[test]
    fn test_read_range_skips_missing_days() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        store.upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 100.0)]).unwrap();
        store
            .upsert("BTCUSDT", date("2024-01-03"), &[candle(DAY1 + 2 * 86_400, 102.0)])
            .unwrap();

        let range = DateRange::new(date("2024-01-01"), date("2024-01-03")).unwrap();
        let read: Vec<Candle> = store
            .read_range("BTCUSDT", range)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(read.len(), 2);
        assert!(read.windows(2).all(|w| w[0].open_time < w[1].open_time));
    }

    #[test]
    fn test_read_range_unknown_symbol() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        let err = store
            .read_range("NOSUCH", DateRange::single(date("2024-01-01")))
            .unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(_)));
    }

    #[test]
    fn test_inventory() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        assert!(store.list_symbols().unwrap().is_empty());

        for (i, day) in ["2024-01-01", "2024-01-02", "2024-01-03"].iter().enumerate() {
            store
                .upsert("BTCUSDT", date(day), &[candle(DAY1 + i as i64 * 86_400, 100.0)])
                .unwrap();
        }
        store.upsert("ETHUSDT", date("2024-01-02"), &[candle(DAY1 + 86_400, 50.0)]).unwrap();

        let inventory = store.list_symbols().unwrap();
        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory[0].symbol, "BTCUSDT");
        assert_eq!(inventory[0].earliest, date("2024-01-01"));
        assert_eq!(inventory[0].latest, date("2024-01-03"));
        assert_eq!(inventory[0].days, 3);
        assert_eq!(inventory[1].symbol, "ETHUSDT");
        assert_eq!(inventory[1].days, 1);
    }

    #[test]
    fn test_delete_range() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        for (i, day) in ["2024-01-01", "2024-01-02", "2024-01-03"].iter().enumerate() {
            store
                .upsert("BTCUSDT", date(day), &[candle(DAY1 + i as i64 * 86_400, 100.0)])
                .unwrap();
        }

        let removed = store
            .delete_range(
                "BTCUSDT",
                DateRange::new(date("2024-01-01"), date("2024-01-02")).unwrap(),
            )
            .unwrap();
        assert_eq!(removed, 2);
        assert!(!store.has_partition("BTCUSDT", date("2024-01-01")));
        assert!(store.has_partition("BTCUSDT", date("2024-01-03")));

        // Re-deleting is a no-op.
        let removed = store
            .delete_range(
                "BTCUSDT",
                DateRange::new(date("2024-01-01"), date("2024-01-02")).unwrap(),
            )
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_delete_range_removes_empty_symbol_dir() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        store.upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 100.0)]).unwrap();

        store
            .delete_range("BTCUSDT", DateRange::single(date("2024-01-01")))
            .unwrap();
        assert!(store.list_symbols().unwrap().is_empty());
        assert!(matches!(
            store.read_range("BTCUSDT", DateRange::single(date("2024-01-01"))),
            Err(Error::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_delete_symbol_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        store.upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 100.0)]).unwrap();

        assert!(store.delete_symbol("BTCUSDT").unwrap());
        assert!(!store.delete_symbol("BTCUSDT").unwrap());
        assert!(!store.delete_symbol("NEVERSTORED").unwrap());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = TimeSeriesStore::new(dir.path());
        store.upsert("BTCUSDT", date("2024-01-01"), &[candle(DAY1, 100.0)]).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("BTCUSDT"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
