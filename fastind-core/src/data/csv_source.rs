//! CSV file data source.
//!
//! Layout: one file per series at `<csv_dir>/<SYMBOL>_<timeframe>.csv`, with a
//! header row `time,open,high,low,close,volume`. `time` is either
//! `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).

use crate::config::EngineConfig;
use crate::data::source::{DataSource, SourceError};
use crate::domain::{Bar, BarData, Timeframe};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvSourceError {
    #[error("csv source requires `csv_dir` to be configured")]
    DirNotConfigured,

    #[error("csv directory does not exist: {0}")]
    DirMissing(PathBuf),

    #[error("no csv file for series: {0}")]
    FileNotFound(PathBuf),

    #[error("csv read error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bad time '{value}' in {path} row {row}")]
    BadTime {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    dir: Option<PathBuf>,
}

impl CsvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the file holding a series.
    pub fn series_path(dir: &Path, symbol: &str, timeframe: Timeframe) -> PathBuf {
        dir.join(format!("{symbol}_{timeframe}.csv"))
    }

    fn read_series(path: &Path) -> Result<Vec<Bar>, CsvSourceError> {
        if !path.is_file() {
            return Err(CsvSourceError::FileNotFound(path.to_path_buf()));
        }
        let csv_err = |source: csv::Error| CsvSourceError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let mut bars = Vec::new();
        for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
            let record = record.map_err(csv_err)?;
            let time = parse_time(&record.time).ok_or_else(|| CsvSourceError::BadTime {
                path: path.to_path_buf(),
                row: row + 1,
                value: record.time.clone(),
            })?;
            bars.push(Bar {
                time,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }
        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);
        Ok(bars)
    }
}

fn parse_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn init(&mut self, config: &EngineConfig) -> Result<(), SourceError> {
        let dir = config.csv_dir.clone().ok_or(CsvSourceError::DirNotConfigured)?;
        if !dir.is_dir() {
            return Err(CsvSourceError::DirMissing(dir).into());
        }
        self.dir = Some(dir);
        Ok(())
    }

    fn get_bar_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<BarData, SourceError> {
        let dir = self.dir.as_deref().ok_or(CsvSourceError::DirNotConfigured)?;
        let path = Self::series_path(dir, symbol, timeframe);
        tracing::debug!(path = %path.display(), "reading csv series");

        let bars = Self::read_series(&path)?
            .into_iter()
            .filter(|b| (date_begin..=date_end).contains(&b.date()))
            .collect();
        Ok(BarData::new(symbol, timeframe, date_begin, date_end, bars))
    }
}
