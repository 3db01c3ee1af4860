//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! Lookback: period (TR[0] has no previous close and is skipped).

use crate::domain::Bar;
use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::window_bars_for;

/// `ATR(symbol, timeframe, period=14)` → series `atr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Atr;

impl Atr {
    pub const NAME: &'static str = "ATR";
    pub const DEFAULT_PERIOD: usize = 14;
}

impl IndicatorRoutine for Atr {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        args.reject_unknown_keywords(Self::NAME, &["period"])?;
        let period = args.period(Self::NAME, "period", Self::DEFAULT_PERIOD)?;
        let bars = window_bars_for(engine, Self::NAME, args)?;

        IndicatorResult::builder(Self::NAME, bars.times())
            .series("atr", atr(bars.bars(), period))
            .build()
    }
}

/// Wilder-smoothed true range, seeded from TR[1..=period].
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    let mut tr = true_range(bars);
    if let Some(first) = tr.first_mut() {
        *first = f64::NAN;
    }
    wilder_smooth(&tr, period)
}

/// True Range series.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    let mut prev_close: Option<f64> = None;
    for bar in bars {
        let (h, l) = (bar.high, bar.low);
        let value = match prev_close {
            None => h - l,
            Some(pc) => (h - l).max((h - pc).abs()).max((l - pc).abs()),
        };
        // f64::max drops NaN operands; keep them visible
        let tainted = h.is_nan() || l.is_nan() || prev_close.is_some_and(f64::is_nan);
        tr.push(if tainted { f64::NAN } else { value });
        prev_close = Some(bar.close);
    }
    tr
}

/// Wilder smoothing, alpha = 1/period. Seeded with the mean of the first run
/// of `period` consecutive non-NaN values; a NaN after the seed taints the rest.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let mut run = 0;
    let mut seed_end = None;
    for (i, v) in values.iter().enumerate() {
        run = if v.is_nan() { 0 } else { run + 1 };
        if run == period {
            seed_end = Some(i + 1);
            break;
        }
    }
    let Some(seed_end) = seed_end else {
        return result;
    };

    let seed = values[seed_end - period..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}
