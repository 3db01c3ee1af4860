//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0.

use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::window_bars_for;

/// `RSI(symbol, timeframe, period=14)` on closes → series `rsi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rsi;

impl Rsi {
    pub const NAME: &'static str = "RSI";
    pub const DEFAULT_PERIOD: usize = 14;
}

impl IndicatorRoutine for Rsi {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        args.reject_unknown_keywords(Self::NAME, &["period"])?;
        let period = args.period(Self::NAME, "period", Self::DEFAULT_PERIOD)?;
        let bars = window_bars_for(engine, Self::NAME, args)?;

        IndicatorResult::builder(Self::NAME, bars.times())
            .series("rsi", rsi(&bars.closes(), period))
            .build()
    }
}

pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let changes: Vec<f64> = std::iter::once(f64::NAN)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .collect();

    // Seed: average gain and average loss over the first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = rsi_value(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let ch = changes[i];
        if ch.is_nan() {
            return result;
        }
        avg_gain = alpha * ch.max(0.0) + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * (-ch).max(0.0) + (1.0 - alpha) * avg_loss;
        result[i] = rsi_value(avg_gain, avg_loss);
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
