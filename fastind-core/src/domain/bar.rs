//! Bar — the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one timeframe interval.
///
/// `time` is the open time of the interval. Volume is fractional because
/// crypto venues report base-asset volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Calendar date of the bar's open time.
    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }

    /// A bar with no trades in its interval.
    pub fn is_empty(&self) -> bool {
        self.volume == 0.0
    }

    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// Overwrite prices with a flat level (used when repairing empty bars).
    pub(crate) fn flatten_to(&mut self, price: f64) {
        self.open = price;
        self.high = price;
        self.low = price;
        self.close = price;
    }
}
