//! The [`IndicatorsEngine`] facade.

use crate::config::{ConfigOverrides, EngineConfig};
use crate::data::{BarDataQualityGate, DataSource, DataSourceSpec};
use crate::domain::{parse_date_input, BarData, DateInput, Timeframe};
use crate::engine::args::{CallKey, IndicatorCall};
use crate::engine::builder::EngineBuilder;
use crate::engine::cache::{CacheStats, ResultCache};
use crate::engine::registry::{IndicatorHandle, IndicatorRegistry};
use crate::engine::result::IndicatorView;
use crate::engine::window::DateWindow;
use crate::error::EngineError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cached indicator computation over one data source.
///
/// Owns the config, the data source, the tracked date window, and the result
/// cache. Every indicator is computed over the whole window and cached by
/// call arguments; callers get read-only slices of the cached result.
pub struct IndicatorsEngine {
    config: EngineConfig,
    gate: BarDataQualityGate,
    source: Box<dyn DataSource>,
    window: DateWindow,
    cache: ResultCache,
    registry: IndicatorRegistry,
    handles: HashMap<String, IndicatorHandle>,
}

impl IndicatorsEngine {
    /// Engine with the default config plus `overrides`, the built-in adapters
    /// and the built-in indicators.
    pub fn new(
        source: impl Into<DataSourceSpec>,
        date_begin: Option<DateInput>,
        date_end: Option<DateInput>,
        overrides: ConfigOverrides,
    ) -> Result<Self, EngineError> {
        let mut builder = EngineBuilder::new(source).overrides(overrides);
        if let Some(begin) = date_begin {
            builder = builder.date_begin(begin);
        }
        if let Some(end) = date_end {
            builder = builder.date_end(end);
        }
        builder.build()
    }

    pub fn builder(source: impl Into<DataSourceSpec>) -> EngineBuilder {
        EngineBuilder::new(source)
    }

    /// Assemble from an already merged config and initialized source.
    pub(crate) fn from_parts(
        config: EngineConfig,
        source: Box<dyn DataSource>,
        registry: IndicatorRegistry,
    ) -> Self {
        Self {
            gate: BarDataQualityGate::from_config(&config),
            config,
            source,
            window: DateWindow::new(),
            cache: ResultCache::new(),
            registry,
            handles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn data_source_name(&self) -> &str {
        self.source.name()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Keys of the results cached in the current epoch.
    pub fn cached_results(&self) -> impl Iterator<Item = &CallKey> {
        self.cache.keys()
    }

    /// Normalize `begin`/`end` and widen the tracked window to cover them.
    ///
    /// Returns the normalized pair. Any actual widening clears the cache.
    /// Fails with `InvalidDateRange` (nothing changed) when the pair or the
    /// widened window is inverted.
    pub fn set_date_interval(
        &mut self,
        begin: Option<&DateInput>,
        end: Option<&DateInput>,
    ) -> Result<(Option<NaiveDate>, Option<NaiveDate>), EngineError> {
        let begin = parse_date_input(begin)?;
        let end = parse_date_input(end)?;

        if let (Some(b), Some(e)) = (begin, end) {
            if b > e {
                return Err(EngineError::InvalidDateRange { begin: b, end: e });
            }
        }

        if self.window.extend(begin, end)? {
            let dropped = self.cache.len();
            self.cache.invalidate();
            tracing::info!(
                begin = ?self.window.begin(),
                end = ?self.window.end(),
                dropped,
                "date window widened, cache cleared"
            );
        }
        Ok((begin, end))
    }

    /// Resolve `name` to a callable handle. Resolution happens once per name.
    pub fn get_indicator(&mut self, name: &str) -> Result<IndicatorHandle, EngineError> {
        if let Some(handle) = self.handles.get(name) {
            return Ok(handle.clone());
        }
        let handle = IndicatorHandle::new(name, self.registry.create(name)?);
        tracing::debug!(indicator = name, "indicator resolved");
        self.handles.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Fetch bars from the data source and pass them through the quality gate.
    pub fn get_bar_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<BarData, EngineError> {
        if date_begin > date_end {
            return Err(EngineError::InvalidDateRange {
                begin: date_begin,
                end: date_end,
            });
        }
        tracing::debug!(
            source = self.source.name(),
            symbol,
            %timeframe,
            %date_begin,
            %date_end,
            "fetching bars"
        );
        let mut bar_data = self.source.get_bar_data(symbol, timeframe, date_begin, date_end)?;
        self.gate.apply(self.source.name(), &mut bar_data)?;
        Ok(bar_data)
    }

    /// Bars over the whole tracked window.
    pub fn window_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<BarData, EngineError> {
        let (begin, end) = self.window.bounds()?;
        self.get_bar_data(symbol, timeframe, begin, end)
    }

    /// Resolve `name` and call it.
    pub fn call_indicator(
        &mut self,
        name: &str,
        call: &IndicatorCall,
    ) -> Result<IndicatorView, EngineError> {
        let handle = self.get_indicator(name)?;
        handle.call(self, call)
    }

    pub fn ohlcv(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("OHLCV", call)
    }

    pub fn sma(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("SMA", call)
    }

    pub fn ema(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("EMA", call)
    }

    pub fn rsi(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("RSI", call)
    }

    pub fn atr(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("ATR", call)
    }

    pub fn cci(&mut self, call: &IndicatorCall) -> Result<IndicatorView, EngineError> {
        self.call_indicator("CCI", call)
    }

    pub(crate) fn invoke(
        &mut self,
        handle: &IndicatorHandle,
        call: &IndicatorCall,
    ) -> Result<IndicatorView, EngineError> {
        let (begin, end) =
            self.set_date_interval(call.date_begin.as_ref(), call.date_end.as_ref())?;

        let key = CallKey::new(handle.name(), &call.args);
        let result = match self.cache.get(&key) {
            Some(result) => {
                tracing::debug!(key = %key, "cache hit");
                result
            }
            None => {
                tracing::debug!(key = %key, epoch = self.cache.epoch(), "cache miss");
                self.window.bounds()?;
                let result = Arc::new(handle.routine().compute(self, &call.args)?);
                self.cache.insert(key, Arc::clone(&result));
                result
            }
        };

        let begin = begin.or(self.window.begin());
        let end = end.or(self.window.end());
        Ok(IndicatorView::slice(result, begin, end))
    }
}

impl fmt::Debug for IndicatorsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorsEngine")
            .field("source", &self.source.name())
            .field("window", &self.window)
            .field("cache", &self.cache.stats())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemorySource;
    use crate::domain::Bar;
    use chrono::Duration;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, d).unwrap()
    }

    fn daily_bars(days: u32) -> Vec<Bar> {
        (0..days)
            .map(|i| {
                let close = 100.0 + f64::from(i);
                Bar {
                    time: ymd(1).and_hms_opt(0, 0, 0).unwrap() + Duration::days(i64::from(i)),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 10.0,
                }
            })
            .collect()
    }

    fn engine() -> IndicatorsEngine {
        let source = InMemorySource::new().with_series("BTCUSDT", Timeframe::D1, daily_bars(20));
        IndicatorsEngine::builder(Box::new(source) as Box<dyn DataSource>)
            .build()
            .unwrap()
    }

    fn date(text: &str) -> DateInput {
        DateInput::from(text)
    }

    #[test]
    fn set_date_interval_returns_normalized_pair() {
        let mut engine = engine();
        let pair = engine
            .set_date_interval(Some(&date("20220703")), Some(&date("2022-07-05 12:00")))
            .unwrap();
        assert_eq!(pair, (Some(ymd(3)), Some(ymd(5))));
        assert_eq!(engine.window().bounds().unwrap(), (ymd(3), ymd(5)));
    }

    #[test]
    fn inverted_pair_leaves_window_untouched() {
        let mut engine = engine();
        engine
            .set_date_interval(Some(&date("2022-07-03")), Some(&date("2022-07-05")))
            .unwrap();
        let err = engine
            .set_date_interval(Some(&date("2022-07-09")), Some(&date("2022-07-08")))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDateRange { .. }));
        assert_eq!(engine.window().bounds().unwrap(), (ymd(3), ymd(5)));
        assert_eq!(engine.cache_stats().invalidations, 1);
    }

    #[test]
    fn garbage_date_is_rejected() {
        let mut engine = engine();
        let err = engine.set_date_interval(Some(&date("soon")), None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidDate(_)));
        assert_eq!(engine.window(), DateWindow::new());
    }

    #[test]
    fn get_indicator_is_idempotent() {
        let mut engine = engine();
        let a = engine.get_indicator("SMA").unwrap();
        let b = engine.get_indicator("SMA").unwrap();
        assert!(a.same_routine(&b));
        assert!(matches!(
            engine.get_indicator("sma"),
            Err(EngineError::UnknownIndicator(_))
        ));
    }

    #[test]
    fn window_bars_requires_full_window() {
        let mut engine = engine();
        engine.set_date_interval(Some(&date("2022-07-02")), None).unwrap();
        assert!(matches!(
            engine.window_bars("BTCUSDT", Timeframe::D1),
            Err(EngineError::DateWindowUndefined)
        ));
        engine.set_date_interval(None, Some(&date("2022-07-04"))).unwrap();
        let bars = engine.window_bars("BTCUSDT", Timeframe::D1).unwrap();
        assert_eq!(bars.len(), 3);
    }

    #[test]
    fn call_without_window_fails() {
        let mut engine = engine();
        let err = engine
            .sma(&IndicatorCall::new().arg("BTCUSDT").arg("1d"))
            .unwrap_err();
        assert!(matches!(err, EngineError::DateWindowUndefined));
        assert_eq!(engine.cache_stats().entries, 0);
    }

    #[test]
    fn accessor_slices_to_requested_dates() {
        let mut engine = engine();
        engine
            .set_date_interval(Some(&date("2022-07-01")), Some(&date("2022-07-20")))
            .unwrap();
        let view = engine
            .ohlcv(&IndicatorCall::new().arg("BTCUSDT").arg("1d").range("2022-07-05", "2022-07-06"))
            .unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.series("close").unwrap(), &[104.0, 105.0]);
        assert_eq!(view.shared().len(), 20);
        assert_eq!(engine.cached_results().count(), 1);
    }

    #[test]
    fn last_representable_end_date_is_accepted() {
        let mut engine = engine();
        engine
            .set_date_interval(Some(&date("2022-07-01")), Some(&date("2022-07-05")))
            .unwrap();
        let view = engine
            .ohlcv(
                &IndicatorCall::new()
                    .arg("BTCUSDT")
                    .arg("1d")
                    .end(DateInput::Date(NaiveDate::MAX)),
            )
            .unwrap();
        assert_eq!(view.len(), 20);
        assert_eq!(engine.window().bounds().unwrap(), (ymd(1), NaiveDate::MAX));
    }

    #[test]
    fn get_bar_data_rejects_inverted_dates() {
        let engine = engine();
        assert!(matches!(
            engine.get_bar_data("BTCUSDT", Timeframe::D1, ymd(5), ymd(4)),
            Err(EngineError::InvalidDateRange { .. })
        ));
    }
}
