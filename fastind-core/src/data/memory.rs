//! In-memory data source backed by preloaded bar series.

use crate::config::EngineConfig;
use crate::data::source::{DataSource, SourceError};
use crate::domain::{Bar, BarData, Timeframe};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemorySourceError {
    #[error("no series loaded for {symbol} {timeframe}")]
    UnknownSeries { symbol: String, timeframe: Timeframe },
}

/// Serves bars from memory, filtered to the requested dates.
///
/// Counts fetches through a shared counter so callers can observe how often
/// the engine reached the source.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<(String, Timeframe), Vec<Bar>>,
    fetches: Arc<AtomicUsize>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a series, replacing any previous one. Bars are sorted by time.
    pub fn insert(&mut self, symbol: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) {
        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);
        self.series.insert((symbol.into(), timeframe), bars);
    }

    pub fn with_series(
        mut self,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Self {
        self.insert(symbol, timeframe, bars);
        self
    }

    /// Shared fetch counter; stays valid after the source moves into an engine.
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl DataSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn init(&mut self, _config: &EngineConfig) -> Result<(), SourceError> {
        Ok(())
    }

    fn get_bar_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<BarData, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let bars = self
            .series
            .get(&(symbol.to_string(), timeframe))
            .ok_or_else(|| MemorySourceError::UnknownSeries {
                symbol: symbol.to_string(),
                timeframe,
            })?;
        let selected = bars
            .iter()
            .filter(|b| (date_begin..=date_end).contains(&b.date()))
            .copied()
            .collect();
        Ok(BarData::new(symbol, timeframe, date_begin, date_end, selected))
    }
}
