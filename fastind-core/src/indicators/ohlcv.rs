//! Raw bars as indicator output.

use crate::engine::{IndicatorArgs, IndicatorResult, IndicatorRoutine, IndicatorsEngine};
use crate::error::EngineError;
use crate::indicators::window_bars_for;

/// `OHLCV(symbol, timeframe)` → series `open high low close volume`, after
/// the quality gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ohlcv;

impl Ohlcv {
    pub const NAME: &'static str = "OHLCV";
}

impl IndicatorRoutine for Ohlcv {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        args.reject_unknown_keywords(Self::NAME, &[])?;
        let bars = window_bars_for(engine, Self::NAME, args)?;

        IndicatorResult::builder(Self::NAME, bars.times())
            .series("open", bars.opens())
            .series("high", bars.highs())
            .series("low", bars.lows())
            .series("close", bars.closes())
            .series("volume", bars.volumes())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::IndicatorCall;
    use crate::error::EngineError;
    use crate::indicators::{make_bars, make_engine};

    #[test]
    fn returns_all_columns() {
        let mut engine = make_engine(make_bars(&[10.0, 11.0, 12.0]));
        let view = engine.ohlcv(&IndicatorCall::new().arg("TEST").arg("1d")).unwrap();
        assert_eq!(
            view.series_names().collect::<Vec<_>>(),
            vec!["open", "high", "low", "close", "volume"]
        );
        assert_eq!(view.series("close").unwrap(), &[10.0, 11.0, 12.0]);
        assert_eq!(view.series("open").unwrap(), &[10.0, 10.0, 11.0]);
    }

    #[test]
    fn rejects_keywords() {
        let mut engine = make_engine(make_bars(&[10.0, 11.0]));
        let err = engine
            .ohlcv(&IndicatorCall::new().arg("TEST").arg("1d").kwarg("period", 3))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument { .. }));
    }

    #[test]
    fn unknown_series_is_adapter_error() {
        let mut engine = make_engine(make_bars(&[10.0, 11.0]));
        let err = engine
            .ohlcv(&IndicatorCall::new().arg("ETHUSDT").arg("1d"))
            .unwrap_err();
        assert!(matches!(err, EngineError::DataSource(_)));
    }
}
