//! Read-side resampling
//!
//! Aggregates native-interval candles into coarser fixed-interval bars
//! aligned to Unix-epoch boundaries. Buckets with no input produce no
//! output bar; gaps in the store stay gaps in the export.

use crate::data::{Candle, Interval};
use crate::error::Result;

/// Resample an ascending candle sequence into `target_secs` bars
///
/// Validates the target against the native interval up front and returns a
/// lazy iterator; nothing is read until the iterator is consumed, and
/// consuming it never touches the store. Per output bar: `open` is the
/// first input's open, `close` the last input's close, `high`/`low` the
/// extremes, volumes the sums, `open_time` the epoch-aligned bucket start.
pub fn resample<I>(candles: I, target_secs: u32) -> Result<ResampleIter<I::IntoIter>>
where
    I: IntoIterator<Item = Result<Candle>>,
{
    let target = Interval::from_secs(target_secs)?;
    Ok(ResampleIter {
        inner: candles.into_iter(),
        target,
        pending: None,
        failed: false,
    })
}

/// Iterator returned by [`resample`]
pub struct ResampleIter<I> {
    inner: I,
    target: Interval,
    /// Bucket currently being accumulated: (bucket index, bar so far)
    pending: Option<(i64, Candle)>,
    failed: bool,
}

impl<I> ResampleIter<I> {
    fn start_bucket(&self, candle: Candle) -> (i64, Candle) {
        let bucket = self.target.bucket_index(candle.open_time);
        let bar = Candle {
            open_time: self.target.floor(candle.open_time),
            interval_secs: self.target.as_secs(),
            ..candle
        };
        (bucket, bar)
    }
}

impl<I> Iterator for ResampleIter<I>
where
    I: Iterator<Item = Result<Candle>>,
{
    type Item = Result<Candle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.inner.next() {
                Some(Ok(candle)) => {
                    let bucket = self.target.bucket_index(candle.open_time);
                    match self.pending.take() {
                        Some((current, mut bar)) if current == bucket => {
                            bar.high = bar.high.max(candle.high);
                            bar.low = bar.low.min(candle.low);
                            bar.close = candle.close;
                            bar.volume += candle.volume;
                            bar.buy_volume += candle.buy_volume;
                            bar.sell_volume += candle.sell_volume;
                            self.pending = Some((current, bar));
                        }
                        Some((_, done)) => {
                            self.pending = Some(self.start_bucket(candle));
                            return Some(Ok(done));
                        }
                        None => {
                            self.pending = Some(self.start_bucket(candle));
                        }
                    }
                }
                Some(Err(e)) => {
                    self.failed = true;
                    self.pending = None;
                    return Some(Err(e));
                }
                None => return self.pending.take().map(|(_, bar)| Ok(bar)),
            }
        }
    }
}
