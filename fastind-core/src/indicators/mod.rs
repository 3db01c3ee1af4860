//! Built-in indicator routines.
//!
//! Every routine takes positional `(symbol, timeframe)`, loads bars over the
//! engine's whole date window, and returns one or more named series aligned
//! to the bar times. Warmup values are `f64::NAN`.
//!
//! The numeric kernels (`sma`, `ema_of_series`, `rsi`, `true_range`,
//! `wilder_smooth`, `cci`) are pure functions over slices.

pub mod atr;
pub mod cci;
pub mod ema;
pub mod ohlcv;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, wilder_smooth, Atr};
pub use cci::{cci, Cci};
pub use ema::{ema_of_series, Ema};
pub use ohlcv::Ohlcv;
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};

use crate::domain::BarData;
use crate::engine::{IndicatorArgs, IndicatorsEngine};
use crate::error::EngineError;
use std::fmt;
use std::str::FromStr;

/// Bar field an indicator is computed on (the `value` keyword).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    /// (high + low + close) / 3
    Typical,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
            PriceField::Typical => "typical",
        }
    }

    pub fn extract(&self, bar_data: &BarData) -> Vec<f64> {
        match self {
            PriceField::Open => bar_data.opens(),
            PriceField::High => bar_data.highs(),
            PriceField::Low => bar_data.lows(),
            PriceField::Close => bar_data.closes(),
            PriceField::Volume => bar_data.volumes(),
            PriceField::Typical => bar_data.typical_prices(),
        }
    }

    /// The `value` keyword of `args`, defaulting to close.
    pub(crate) fn from_args(indicator: &str, args: &IndicatorArgs) -> Result<Self, EngineError> {
        args.keyword_str(indicator, "value", "close")?
            .parse()
            .map_err(|e: String| EngineError::invalid_argument(indicator, e))
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "volume" => Ok(PriceField::Volume),
            "typical" => Ok(PriceField::Typical),
            other => Err(format!(
                "unknown value field '{other}' (expected open|high|low|close|volume|typical)"
            )),
        }
    }
}

/// Bars for the `(symbol, timeframe)` positional arguments over the engine
/// window. Extra positional arguments are rejected.
pub(crate) fn window_bars_for(
    engine: &IndicatorsEngine,
    indicator: &str,
    args: &IndicatorArgs,
) -> Result<BarData, EngineError> {
    let (symbol, timeframe) = args.symbol_timeframe(indicator)?;
    let count = args.positional().len();
    if count > 2 {
        return Err(EngineError::invalid_argument(
            indicator,
            format!("expected (symbol, timeframe), got {count} positional arguments"),
        ));
    }
    engine.window_bars(symbol, timeframe)
}

/// Create bars from close prices for testing.
///
/// Daily bars from 2022-07-01: open = prev close (or close for the first
/// bar), high = max(open, close) + 1, low = min(open, close) - 1, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let start = chrono::NaiveDate::from_ymd_opt(2022, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Engine over an in-memory `TEST 1d` series with the window set to cover
/// every bar.
#[cfg(test)]
pub fn make_engine(bars: Vec<crate::domain::Bar>) -> IndicatorsEngine {
    use crate::data::{DataSource, InMemorySource};
    use crate::domain::Timeframe;
    let first = bars.first().map(|b| b.date()).unwrap();
    let last = bars.last().map(|b| b.date()).unwrap();
    let source = InMemorySource::new().with_series("TEST", Timeframe::D1, bars);
    IndicatorsEngine::builder(Box::new(source) as Box<dyn DataSource>)
        .dates(first, last)
        .build()
        .unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
