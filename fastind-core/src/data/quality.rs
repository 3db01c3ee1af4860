//! Bar data quality gate.
//!
//! Decides whether a fetched series is usable before any indicator sees it:
//! 1. required endpoints (non-empty series, non-zero first/last close)
//! 2. empty-bar thresholds (fraction and longest consecutive run)
//! 3. optional in-place repair of empty bars
//!
//! Checks run in that order; the first failing check wins.

use crate::config::EngineConfig;
use crate::domain::BarData;
use crate::error::EngineError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct BarDataQualityGate {
    pub endpoints_required: bool,
    pub max_empty_bars_fraction: Option<f64>,
    pub max_empty_bars_consecutive: Option<usize>,
    pub restore_empty_bars: bool,
}

impl BarDataQualityGate {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            endpoints_required: config.endpoints_required,
            max_empty_bars_fraction: config.max_empty_bars_fraction,
            max_empty_bars_consecutive: config.max_empty_bars_consecutive,
            restore_empty_bars: config.restore_empty_bars,
        }
    }

    /// Validate and optionally repair `bar_data`. `source_name` is reported in
    /// [`EngineError::TooManyEmptyBars`].
    pub fn apply(&self, source_name: &str, bar_data: &mut BarData) -> Result<(), EngineError> {
        if self.endpoints_required {
            self.check_endpoints(bar_data)?;
        }

        if self.max_empty_bars_fraction.is_some() || self.max_empty_bars_consecutive.is_some() {
            self.check_empty_bars(source_name, bar_data)?;
        }

        if self.restore_empty_bars {
            let repaired = bar_data.restore_bar_data();
            if repaired > 0 {
                tracing::warn!(
                    symbol = bar_data.symbol(),
                    timeframe = %bar_data.timeframe(),
                    repaired,
                    "restored empty bars"
                );
            }
        }

        Ok(())
    }

    fn check_endpoints(&self, bar_data: &BarData) -> Result<(), EngineError> {
        let not_found = |date: NaiveDate| {
            tracing::warn!(symbol = bar_data.symbol(), %date, "required endpoint missing");
            EngineError::SourceDataNotFound {
                symbol: bar_data.symbol().to_string(),
                date,
            }
        };

        let (Some(first), Some(last)) = (bar_data.bars().first(), bar_data.bars().last()) else {
            return Err(not_found(bar_data.date_begin()));
        };
        if first.close == 0.0 {
            return Err(not_found(bar_data.date_begin()));
        }
        if last.close == 0.0 {
            return Err(not_found(bar_data.date_end()));
        }
        Ok(())
    }

    fn check_empty_bars(&self, source_name: &str, bar_data: &BarData) -> Result<(), EngineError> {
        let stats = bar_data.empty_bar_stats();

        let fraction_exceeded = matches!(
            (stats.fraction, self.max_empty_bars_fraction),
            (Some(actual), Some(limit)) if actual > limit
        );
        let consecutive_exceeded = matches!(
            (stats.consecutive, self.max_empty_bars_consecutive),
            (Some(actual), Some(limit)) if actual > limit
        );

        if fraction_exceeded || consecutive_exceeded {
            tracing::warn!(
                source = source_name,
                symbol = bar_data.symbol(),
                fraction = ?stats.fraction,
                consecutive = ?stats.consecutive,
                "too many empty bars"
            );
            return Err(EngineError::TooManyEmptyBars {
                source_name: source_name.to_string(),
                symbol: bar_data.symbol().to_string(),
                timeframe: bar_data.timeframe(),
                first_bar_time: bar_data.first_bar_time(),
                end_bar_time: bar_data.end_bar_time(),
                fraction: stats.fraction,
                consecutive: stats.consecutive,
            });
        }
        Ok(())
    }
}
