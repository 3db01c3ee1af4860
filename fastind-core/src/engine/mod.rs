//! Indicator engine: date window, result cache, and indicator dispatch.
//!
//! A call flows through the engine as:
//!
//! 1. Widen the tracked date window (clears the cache if it grew)
//! 2. Look up the call key in the result cache
//! 3. On a miss, run the routine over the whole window and cache the result
//! 4. Slice the full-window result down to the requested dates

pub mod args;
pub mod builder;
pub mod cache;
pub mod facade;
pub mod registry;
pub mod result;
pub mod window;

pub use args::{ArgValue, CallKey, IndicatorArgs, IndicatorCall};
pub use builder::EngineBuilder;
pub use cache::{CacheStats, ResultCache};
pub use facade::IndicatorsEngine;
pub use registry::{IndicatorFactory, IndicatorHandle, IndicatorRegistry, IndicatorRoutine};
pub use result::{IndicatorResult, IndicatorResultBuilder, IndicatorView};
pub use window::DateWindow;
