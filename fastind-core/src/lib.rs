//! fastind core: cached indicator computation over OHLCV bar data.
//!
//! This crate contains:
//! - Domain types (bars, bar series, timeframes, loose date inputs)
//! - Data source trait, built-in adapters and the bar data quality gate
//! - The indicator engine: monotonically widening date window, result cache
//!   keyed by call arguments, lazy indicator dispatch, read-only result views
//! - Built-in indicator routines (OHLCV, SMA, EMA, RSI, ATR, CCI)
//!
//! ```no_run
//! use fastind_core::engine::{IndicatorCall, IndicatorsEngine};
//!
//! let mut engine = IndicatorsEngine::builder("synthetic")
//!     .dates("2022-07-01", "2022-07-31")
//!     .build()?;
//! let cci = engine.cci(
//!     &IndicatorCall::new()
//!         .arg("BTCUSDT")
//!         .arg("5m")
//!         .kwarg("period", 20)
//!         .range("2022-07-10", "2022-07-12"),
//! )?;
//! println!("{} values", cci.len());
//! # Ok::<(), fastind_core::EngineError>(())
//! ```

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;

pub use config::{ConfigError, ConfigOverrides, EngineConfig};
pub use engine::{EngineBuilder, IndicatorCall, IndicatorView, IndicatorsEngine};
pub use error::EngineError;
