//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::{window_bars_for, PriceField};

/// `SMA(symbol, timeframe, period=14, value="close")` → series `sma`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sma;

impl Sma {
    pub const NAME: &'static str = "SMA";
    pub const DEFAULT_PERIOD: usize = 14;
}

impl IndicatorRoutine for Sma {
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
            .series("sma", sma(&field.extract(&bars), period))
            .build()
    }
}

/// Rolling mean of `values`. A NaN anywhere in a window makes that output NaN.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = false;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            nan_in_window = true;
        }
        sum += v;
    }
    if !nan_in_window {
        result[period - 1] = sum / period as f64;
    }

    for i in period..n {
        let leaving = values[i - period];
        let entering = values[i];
        sum = sum - leaving + entering;

        // A NaN poisons the running sum; rescan the window until it leaves.
        if entering.is_nan() || leaving.is_nan() || nan_in_window {
            nan_in_window = false;
            sum = 0.0;
            for &v in &values[(i + 1 - period)..=i] {
                if v.is_nan() {
                    nan_in_window = true;
                }
                sum += v;
            }
            if nan_in_window {
                continue;
            }
        }

        result[i] = sum / period as f64;
    }

    result
}
