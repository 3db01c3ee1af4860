//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[period-1] = SMA of the first `period` values.
//! Lookback: period - 1.

use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::{window_bars_for, PriceField};

/// `EMA(symbol, timeframe, period=14, value="close")` → series `ema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ema;

impl Ema {
    pub const NAME: &'static str = "EMA";
    pub const DEFAULT_PERIOD: usize = 14;
}

impl IndicatorRoutine for Ema {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        args.reject_unknown_keywords(Self::NAME, &["period", "value"])?;
        let period = args.period(Self::NAME, "period", Self::DEFAULT_PERIOD)?;
        let field = PriceField::from_args(Self::NAME, args)?;
        let bars = window_bars_for(engine, Self::NAME, args)?;

        IndicatorResult::builder(Self::NAME, bars.times())
            .series("ema", ema_of_series(&field.extract(&bars), period))
            .build()
    }
}

/// EMA of an arbitrary series. A NaN in the seed window yields all NaN; a NaN
/// after the seed taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}
