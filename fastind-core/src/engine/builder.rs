//! Step-by-step engine construction.

use crate::config::{ConfigOverrides, EngineConfig};
use crate::data::{DataSourceRegistry, DataSourceSpec};
use crate::domain::DateInput;
use crate::engine::facade::IndicatorsEngine;
use crate::engine::registry::{IndicatorRegistry, IndicatorRoutine};
use crate::error::EngineError;

/// Collects the data source, initial dates, config and registries, then
/// builds an [`IndicatorsEngine`].
///
/// Defaults: [`EngineConfig::default`], no overrides, the built-in source
/// adapters and indicator routines.
#[derive(Debug)]
pub struct EngineBuilder {
    source: DataSourceSpec,
    date_begin: Option<DateInput>,
    date_end: Option<DateInput>,
    config: EngineConfig,
    overrides: ConfigOverrides,
    sources: DataSourceRegistry,
    indicators: IndicatorRegistry,
}

impl EngineBuilder {
    pub fn new(source: impl Into<DataSourceSpec>) -> Self {
        Self {
            source: source.into(),
            date_begin: None,
            date_end: None,
            config: EngineConfig::default(),
            overrides: ConfigOverrides::default(),
            sources: DataSourceRegistry::with_defaults(),
            indicators: IndicatorRegistry::with_defaults(),
        }
    }

    pub fn date_begin(mut self, date: impl Into<DateInput>) -> Self {
        self.date_begin = Some(date.into());
        self
    }

    pub fn date_end(mut self, date: impl Into<DateInput>) -> Self {
        self.date_end = Some(date.into());
        self
    }

    pub fn dates(self, begin: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.date_begin(begin).date_end(end)
    }

    /// Base config; overrides are merged on top at build time.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn source_registry(mut self, sources: DataSourceRegistry) -> Self {
        self.sources = sources;
        self
    }

    pub fn indicator_registry(mut self, indicators: IndicatorRegistry) -> Self {
        self.indicators = indicators;
        self
    }

    /// Add or replace a single indicator routine.
    pub fn indicator<R>(mut self, name: &str, routine: R) -> Self
    where
        R: IndicatorRoutine + 'static,
    {
        self.indicators.register_routine(name, routine);
        self
    }

    /// Merge config, resolve and initialize the data source, then apply the
    /// initial dates.
    pub fn build(self) -> Result<IndicatorsEngine, EngineError> {
        let config = self.config.merged(&self.overrides)?;
        let source = self.sources.resolve(self.source, &config)?;
        let mut engine = IndicatorsEngine::from_parts(config, source, self.indicators);
        engine.set_date_interval(self.date_begin.as_ref(), self.date_end.as_ref())?;
        Ok(engine)
    }
}
