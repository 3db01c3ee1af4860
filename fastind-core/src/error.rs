//! Engine error types.

use crate::config::ConfigError;
use crate::data::SourceError;
use crate::domain::Timeframe;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors surfaced by the indicator engine.
///
/// Data-source failures are carried through [`EngineError::DataSource`]
/// unchanged; the engine never rewraps adapter-specific errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid date range: begin {begin} is after end {end}")]
    InvalidDateRange { begin: NaiveDate, end: NaiveDate },

    #[error("cannot interpret '{0}' as a date")]
    InvalidDate(String),

    #[error("date window is not fully defined (set both begin and end before computing)")]
    DateWindowUndefined,

    #[error("unknown data source: {0}")]
    UnknownDataSource(String),

    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("invalid argument for {indicator}: {message}")]
    InvalidArgument { indicator: String, message: String },

    #[error("indicator {indicator} produced an invalid result: {message}")]
    InvalidResult { indicator: String, message: String },

    #[error("source data not found for {symbol} at {date}")]
    SourceDataNotFound { symbol: String, date: NaiveDate },

    #[error(
        "too many empty bars in {source_name} {symbol} {timeframe} \
         ({}..{}): fraction={}, consecutive={}",
        fmt_time(.first_bar_time),
        fmt_time(.end_bar_time),
        fmt_opt(.fraction),
        fmt_opt(.consecutive)
    )]
    TooManyEmptyBars {
        source_name: String,
        symbol: String,
        timeframe: Timeframe,
        first_bar_time: Option<NaiveDateTime>,
        end_bar_time: Option<NaiveDateTime>,
        fraction: Option<f64>,
        consecutive: Option<usize>,
    },

    #[error(transparent)]
    DataSource(#[from] SourceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn invalid_argument(indicator: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            indicator: indicator.to_string(),
            message: message.into(),
        }
    }
}

fn fmt_time(t: &Option<NaiveDateTime>) -> String {
    t.map_or_else(|| "-".to_string(), |t| t.to_string())
}

fn fmt_opt<T: std::fmt::Display>(v: &Option<T>) -> String {
    v.as_ref().map_or_else(|| "n/a".to_string(), |v| v.to_string())
}
