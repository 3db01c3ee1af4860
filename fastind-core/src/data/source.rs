//! Data source trait and the registry that resolves adapters by name.
//!
//! The `DataSource` trait abstracts over bar providers (in-memory fixtures,
//! CSV files, synthetic generators) so the engine can swap implementations
//! and mock them in tests. The quality gate sits above this trait; adapters
//! don't know about it.

use crate::config::EngineConfig;
use crate::data::{CsvSource, InMemorySource, SyntheticSource};
use crate::domain::{BarData, Timeframe};
use crate::error::EngineError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// Adapter-specific failure. Passed through the engine unchanged.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

pub trait DataSource: Send + Sync {
    /// Short identifier used in logs and error reports.
    fn name(&self) -> &str;

    /// One-time setup. May perform I/O and fail on misconfiguration.
    fn init(&mut self, config: &EngineConfig) -> Result<(), SourceError>;

    /// Fetch bars whose open time falls on `date_begin..=date_end`, sorted by time.
    fn get_bar_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<BarData, SourceError>;
}

/// How the engine gets its data source: by registered name, or ready-made.
pub enum DataSourceSpec {
    Named(String),
    Handle(Box<dyn DataSource>),
}

impl fmt::Debug for DataSourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            DataSourceSpec::Handle(source) => {
                f.debug_tuple("Handle").field(&source.name()).finish()
            }
        }
    }
}

impl From<&str> for DataSourceSpec {
    fn from(name: &str) -> Self {
        DataSourceSpec::Named(name.to_string())
    }
}

impl From<String> for DataSourceSpec {
    fn from(name: String) -> Self {
        DataSourceSpec::Named(name)
    }
}

impl From<Box<dyn DataSource>> for DataSourceSpec {
    fn from(source: Box<dyn DataSource>) -> Self {
        DataSourceSpec::Handle(source)
    }
}

/// Factory building an uninitialized adapter.
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSource> + Send + Sync>;

/// Registry of data source adapters by name.
pub struct DataSourceRegistry {
    factories: HashMap<String, DataSourceFactory>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in `memory`, `synthetic` and `csv` adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("memory", || Box::new(InMemorySource::new()));
        registry.register("synthetic", || Box::new(SyntheticSource::new()));
        registry.register("csv", || Box::new(CsvSource::new()));
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn DataSource> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an adapter by name (not yet initialized).
    pub fn create(&self, name: &str) -> Result<Box<dyn DataSource>, EngineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::UnknownDataSource(name.to_string()))?;
        Ok(factory())
    }

    /// Turn a spec into an initialized adapter.
    pub fn resolve(
        &self,
        spec: DataSourceSpec,
        config: &EngineConfig,
    ) -> Result<Box<dyn DataSource>, EngineError> {
        let mut source = match spec {
            DataSourceSpec::Named(name) => self.create(&name)?,
            DataSourceSpec::Handle(source) => source,
        };
        source.init(config)?;
        tracing::info!(source = source.name(), "data source initialized");
        Ok(source)
    }
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for DataSourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceRegistry")
            .field("names", &self.names())
            .finish()
    }
}
