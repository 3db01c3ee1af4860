//! Commodity Channel Index (CCI).
//!
//! CCI = (TP - SMA(TP)) / (0.015 * mean absolute deviation of TP)
//! where TP = (high + low + close) / 3.
//! Lookback: period - 1. A flat window (zero deviation) gives 0.

use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::{sma, window_bars_for};

/// Lambert's scaling constant.
const CCI_SCALE: f64 = 0.015;

/// `CCI(symbol, timeframe, period=20)` → series `cci`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cci;

impl Cci {
    pub const NAME: &'static str = "CCI";
    pub const DEFAULT_PERIOD: usize = 20;
}

impl IndicatorRoutine for Cci {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        args.reject_unknown_keywords(Self::NAME, &["period"])?;
        let period = args.period(Self::NAME, "period", Self::DEFAULT_PERIOD)?;
        let bars = window_bars_for(engine, Self::NAME, args)?;

        IndicatorResult::builder(Self::NAME, bars.times())
            .series("cci", cci(&bars.typical_prices(), period))
            .build()
    }
}

/// CCI over a typical-price series.
pub fn cci(typical: &[f64], period: usize) -> Vec<f64> {
    let mean = sma(typical, period);
    let mut result = vec![f64::NAN; typical.len()];

    for (i, &m) in mean.iter().enumerate() {
        if m.is_nan() {
            continue;
        }
        let window = &typical[i + 1 - period..=i];
        let deviation = window.iter().map(|tp| (tp - m).abs()).sum::<f64>() / period as f64;
        result[i] = if deviation == 0.0 {
            0.0
        } else {
            (typical[i] - m) / (CCI_SCALE * deviation)
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IndicatorCall;
    use crate::indicators::{assert_approx, make_bars, make_engine, DEFAULT_EPSILON};

    #[test]
    fn cci_known_values() {
        // period 3 over [1, 2, 3]: mean 2, deviation 2/3
        // CCI = (3 - 2) / (0.015 * 2/3) = 100
        let result = cci(&[1.0, 2.0, 3.0, 2.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0, 1e-9);
        // [2, 3, 2]: mean 7/3, deviation (1/3 + 2/3 + 1/3) / 3 = 4/9
        // CCI = (2 - 7/3) / (0.015 * 4/9) = -50
        assert_approx(result[3], -50.0, 1e-9);
    }

    #[test]
    fn cci_flat_is_zero() {
        let result = cci(&[5.0; 5], 3);
        assert_approx(result[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cci_too_few_values() {
        assert!(cci(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cci_period_one_is_zero() {
        // Single-value windows have no deviation.
        assert!(cci(&[1.0, 4.0, 9.0], 1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn routine_default_period() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + f64::from(i % 5)).collect();
        let mut engine = make_engine(make_bars(&closes));
        let view = engine
            .cci(&IndicatorCall::new().arg("TEST").arg("1d"))
            .unwrap();
        let values = view.series("cci").unwrap();
        assert_eq!(values.len(), 25);
        assert!(values[18].is_nan());
        assert!(values[19].is_finite());
    }
}
