//! BarData — a fetched bar series for one symbol and timeframe.
//!
//! Carries the requested date range alongside the bars so the quality gate can
//! cite the boundary that is missing, and exposes the empty-bar metrics the
//! gate thresholds are compared against.

use crate::domain::{Bar, Timeframe};
use chrono::{NaiveDate, NaiveDateTime};

/// Empty-bar quality metrics of a series.
///
/// Both metrics are `None` when the series has no bars; a series with bars but
/// no empty bars reports `Some(0.0)` / `Some(0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmptyBarStats {
    /// Zero-volume bars divided by total bars.
    pub fraction: Option<f64>,
    /// Longest run of consecutive zero-volume bars.
    pub consecutive: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarData {
    symbol: String,
    timeframe: Timeframe,
    date_begin: NaiveDate,
    date_end: NaiveDate,
    bars: Vec<Bar>,
}

impl BarData {
    /// Bars must be sorted by time; adapters are responsible for ordering.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
        bars: Vec<Bar>,
    ) -> Self {
        debug_assert!(
            bars.windows(2).all(|w| w[0].time < w[1].time),
            "bars must be strictly increasing in time"
        );
        Self {
            symbol: symbol.into(),
            timeframe,
            date_begin,
            date_end,
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Requested first date (inclusive).
    pub fn date_begin(&self) -> NaiveDate {
        self.date_begin
    }

    /// Requested last date (inclusive).
    pub fn date_end(&self) -> NaiveDate {
        self.date_end
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_bar_time(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.time)
    }

    pub fn end_bar_time(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.time)
    }

    pub fn times(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.time).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn typical_prices(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::typical_price).collect()
    }

    /// Empty-bar fraction and longest consecutive empty run.
    pub fn empty_bar_stats(&self) -> EmptyBarStats {
        if self.bars.is_empty() {
            return EmptyBarStats {
                fraction: None,
                consecutive: None,
            };
        }

        let mut empty = 0usize;
        let mut run = 0usize;
        let mut longest = 0usize;
        for bar in &self.bars {
            if bar.is_empty() {
                empty += 1;
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }

        EmptyBarStats {
            fraction: Some(empty as f64 / self.bars.len() as f64),
            consecutive: Some(longest),
        }
    }

    /// Repair zero-volume bars in place.
    ///
    /// Each empty bar is flattened to the close of the preceding bar. Empty bars
    /// before the first traded bar take that bar's open. Volume stays zero.
    /// A series without any traded bar is left as is.
    ///
    /// Returns the number of repaired bars.
    pub fn restore_bar_data(&mut self) -> usize {
        let Some(first_traded) = self.bars.iter().position(|b| !b.is_empty()) else {
            return 0;
        };

        let lead_price = self.bars[first_traded].open;
        for bar in &mut self.bars[..first_traded] {
            bar.flatten_to(lead_price);
        }

        let mut repaired = first_traded;
        let mut prev_close = self.bars[first_traded].close;
        for bar in &mut self.bars[first_traded + 1..] {
            if bar.is_empty() {
                bar.flatten_to(prev_close);
                repaired += 1;
            }
            prev_close = bar.close;
        }

        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_bar_data(volumes: &[f64]) -> BarData {
        let start = NaiveDate::from_ymd_opt(2022, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| {
                let close = 100.0 + i as f64;
                Bar {
                    time: start + Duration::minutes(5 * i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume,
                }
            })
            .collect();
        BarData::new(
            "BTCUSDT",
            Timeframe::M5,
            start.date(),
            start.date(),
            bars,
        )
    }

    #[test]
    fn stats_none_without_bars() {
        let data = make_bar_data(&[]);
        let stats = data.empty_bar_stats();
        assert_eq!(stats.fraction, None);
        assert_eq!(stats.consecutive, None);
    }

    #[test]
    fn stats_zero_without_empty_bars() {
        let data = make_bar_data(&[1.0, 2.0, 3.0]);
        let stats = data.empty_bar_stats();
        assert_eq!(stats.fraction, Some(0.0));
        assert_eq!(stats.consecutive, Some(0));
    }

    #[test]
    fn stats_count_longest_run() {
        let data = make_bar_data(&[1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let stats = data.empty_bar_stats();
        assert!((stats.fraction.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(stats.consecutive, Some(3));
    }

    #[test]
    fn stats_all_empty() {
        let data = make_bar_data(&[0.0, 0.0]);
        let stats = data.empty_bar_stats();
        assert_eq!(stats.fraction, Some(1.0));
        assert_eq!(stats.consecutive, Some(2));
    }

    #[test]
    fn restore_fills_from_previous_close() {
        let mut data = make_bar_data(&[1.0, 0.0, 0.0, 1.0]);
        let repaired = data.restore_bar_data();
        assert_eq!(repaired, 2);

        let bars = data.bars();
        for bar in &bars[1..3] {
            assert_eq!(bar.open, 100.0);
            assert_eq!(bar.high, 100.0);
            assert_eq!(bar.low, 100.0);
            assert_eq!(bar.close, 100.0);
            assert_eq!(bar.volume, 0.0);
        }
        // Traded bar untouched
        assert_eq!(bars[3].close, 103.0);
    }

    #[test]
    fn restore_leading_empty_bars_use_first_open() {
        let mut data = make_bar_data(&[0.0, 0.0, 1.0]);
        let repaired = data.restore_bar_data();
        assert_eq!(repaired, 2);
        // First traded bar (index 2) opens at 101.5
        assert_eq!(data.bars()[0].close, 101.5);
        assert_eq!(data.bars()[1].open, 101.5);
    }

    #[test]
    fn restore_all_empty_is_noop() {
        let mut data = make_bar_data(&[0.0, 0.0]);
        let before = data.clone();
        assert_eq!(data.restore_bar_data(), 0);
        assert_eq!(data, before);
    }

    #[test]
    fn column_accessors_align() {
        let data = make_bar_data(&[1.0, 2.0]);
        assert_eq!(data.closes(), vec![100.0, 101.0]);
        assert_eq!(data.volumes(), vec![1.0, 2.0]);
        assert_eq!(data.times().len(), 2);
        assert_eq!(data.first_bar_time(), Some(data.bars()[0].time));
        assert_eq!(data.end_bar_time(), Some(data.bars()[1].time));
    }
}
