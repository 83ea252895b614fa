//! Bybit public trade tape parsing and 1-second aggregation

use crate::data::{Candle, NATIVE_INTERVAL_SECS};
use chrono::DateTime;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Taker side of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
    /// The tape occasionally carries rows with an empty or unknown side
    Other,
}

/// Custom deserializer: tolerate sides beyond Buy/Sell instead of failing
/// the whole archive
fn side<'de, D>(deserializer: D) -> Result<Side, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(match s.as_str() {
        "Buy" => Side::Buy,
        "Sell" => Side::Sell,
        _ => Side::Other,
    })
}

/// One row of the public daily trade archive
///
/// The archive has more columns (tick direction, match id, notionals); the
/// header-based CSV reader ignores everything not named here.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    /// Trade time as fractional epoch seconds
    pub timestamp: f64,
    #[serde(deserialize_with = "side")]
    pub side: Side,
    /// Traded quantity
    pub size: f64,
    /// Traded price
    pub price: f64,
}

#[derive(Debug)]
struct SecondAcc {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    buy_volume: f64,
    sell_volume: f64,
}

/// Aggregate a day's trade tape into ascending 1-second candles
///
/// Trades are ordered by timestamp first (some archives arrive newest-first)
/// so open/close follow actual trade time. Seconds with no trades simply
/// produce no candle.
pub fn aggregate_trades(symbol: &str, mut trades: Vec<TradeRecord>) -> Vec<Candle> {
    trades.sort_by(|a, b| {
        a.timestamp
            .partial_cmp(&b.timestamp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seconds: BTreeMap<i64, SecondAcc> = BTreeMap::new();
    for trade in &trades {
        let sec = trade.timestamp.floor() as i64;
        let (buy, sell) = match trade.side {
            Side::Buy => (trade.size, 0.0),
            Side::Sell => (0.0, trade.size),
            Side::Other => (0.0, 0.0),
        };
        seconds
            .entry(sec)
            .and_modify(|acc| {
                acc.high = acc.high.max(trade.price);
                acc.low = acc.low.min(trade.price);
                acc.close = trade.price;
                acc.volume += trade.size;
                acc.buy_volume += buy;
                acc.sell_volume += sell;
            })
            .or_insert(SecondAcc {
                open: trade.price,
                high: trade.price,
                low: trade.price,
                close: trade.price,
                volume: trade.size,
                buy_volume: buy,
                sell_volume: sell,
            });
    }

    seconds
        .into_iter()
        .filter_map(|(sec, acc)| {
            let open_time = DateTime::from_timestamp(sec, 0)?;
            Some(Candle::new(
                symbol.to_string(),
                open_time,
                NATIVE_INTERVAL_SECS,
                acc.open,
                acc.high,
                acc.low,
                acc.close,
                acc.volume,
                acc.buy_volume,
                acc.sell_volume,
            ))
        })
        .collect()
}
