//! Indicator routines, the name → routine registry, and resolved handles.

use crate::engine::args::{IndicatorArgs, IndicatorCall};
use crate::engine::result::{IndicatorResult, IndicatorView};
use crate::engine::IndicatorsEngine;
use crate::error::EngineError;
use crate::indicators::{Atr, Cci, Ema, Ohlcv, Rsi, Sma};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A computation producing one [`IndicatorResult`] over the engine's whole
/// date window.
///
/// Routines read bars and config through the shared engine reference; they
/// cannot touch the window or the cache.
pub trait IndicatorRoutine: Send + Sync {
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError>;
}

impl<F> IndicatorRoutine for F
where
    F: Fn(&IndicatorsEngine, &IndicatorArgs) -> Result<IndicatorResult, EngineError> + Send + Sync,
{
    fn compute(
        &self,
        engine: &IndicatorsEngine,
        args: &IndicatorArgs,
    ) -> Result<IndicatorResult, EngineError> {
        self(engine, args)
    }
}

/// Factory producing a routine on first use of its name.
pub type IndicatorFactory = Box<dyn Fn() -> Arc<dyn IndicatorRoutine> + Send + Sync>;

/// Registry of indicator routines by name.
pub struct IndicatorRegistry {
    factories: HashMap<String, IndicatorFactory>,
}

impl IndicatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in routines (`OHLCV`, `SMA`, `EMA`, `RSI`,
    /// `ATR`, `CCI`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_routine(Ohlcv::NAME, Ohlcv);
        registry.register_routine(Sma::NAME, Sma);
        registry.register_routine(Ema::NAME, Ema);
        registry.register_routine(Rsi::NAME, Rsi);
        registry.register_routine(Atr::NAME, Atr);
        registry.register_routine(Cci::NAME, Cci);
        registry
    }

    /// Register a factory, replacing any previous entry under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn IndicatorRoutine> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Register a ready-made routine. Every resolution shares the same instance.
    pub fn register_routine<R>(&mut self, name: &str, routine: R)
    where
        R: IndicatorRoutine + 'static,
    {
        let routine: Arc<dyn IndicatorRoutine> = Arc::new(routine);
        self.register(name, move || Arc::clone(&routine));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the routine registered under `name`.
    pub fn create(&self, name: &str) -> Result<Arc<dyn IndicatorRoutine>, EngineError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::UnknownIndicator(name.to_string()))?;
        Ok(factory())
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for IndicatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// A resolved indicator, callable against the engine that produced it.
#[derive(Clone)]
pub struct IndicatorHandle {
    name: Arc<str>,
    routine: Arc<dyn IndicatorRoutine>,
}

impl IndicatorHandle {
    pub(crate) fn new(name: &str, routine: Arc<dyn IndicatorRoutine>) -> Self {
        Self {
            name: Arc::from(name),
            routine,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn routine(&self) -> &dyn IndicatorRoutine {
        self.routine.as_ref()
    }

    /// Whether both handles dispatch to the same routine instance.
    pub fn same_routine(&self, other: &IndicatorHandle) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.routine) as *const (),
            Arc::as_ptr(&other.routine) as *const (),
        )
    }

    /// Run the indicator (or reuse its cached result) and slice it to the
    /// call's dates.
    pub fn call(
        &self,
        engine: &mut IndicatorsEngine,
        call: &IndicatorCall,
    ) -> Result<IndicatorView, EngineError> {
        engine.invoke(self, call)
    }
}

impl fmt::Debug for IndicatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorHandle").field("name", &self.name).finish()
    }
}
