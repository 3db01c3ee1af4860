//! Synthetic data source.
//!
//! Generates deterministic bars for any symbol. Each bar is derived from a seed
//! built from the symbol, timeframe, configured seed and the bar's open time, so
//! the same bar is produced whatever date range is requested. Useful for demos
//! and tests; never a substitute for market data.

use crate::config::EngineConfig;
use crate::data::source::{DataSource, SourceError};
use crate::domain::{Bar, BarData, Timeframe};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    seed: u64,
    empty_bar_ratio: f64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of bars generated with zero volume (clamped to `0.0..=1.0`).
    pub fn with_empty_bar_ratio(mut self, ratio: f64) -> Self {
        self.empty_bar_ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        self
    }

    fn series_key(&self, symbol: &str, timeframe: Timeframe) -> u64 {
        let hash = blake3::hash(format!("{symbol}/{timeframe}/{}", self.seed).as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    fn make_bar(&self, key: u64, timeframe: Timeframe, time: NaiveDateTime) -> Bar {
        let minute = minutes_since_epoch(time);
        let mix = (minute as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(key ^ mix);

        let base = 50.0 + (key % 1000) as f64;
        let cycle = (timeframe.minutes() * 500) as f64;
        let level = base * (1.0 + 0.05 * (minute as f64 / cycle).sin());

        let open = level * (1.0 + rng.gen_range(-0.002..0.002));
        let close = level * (1.0 + rng.gen_range(-0.002..0.002));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.002));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.002));
        let volume = if rng.gen_bool(self.empty_bar_ratio) {
            0.0
        } else {
            rng.gen_range(1.0..100.0)
        };

        Bar {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

// 0001-01-01 to 1970-01-01
const CE_TO_UNIX_DAYS: i64 = 719_163;

fn minutes_since_epoch(time: NaiveDateTime) -> i64 {
    let days = i64::from(time.date().num_days_from_ce()) - CE_TO_UNIX_DAYS;
    days * 1440 + i64::from(time.time().num_seconds_from_midnight() / 60)
}

impl DataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn init(&mut self, config: &EngineConfig) -> Result<(), SourceError> {
        self.seed = config.synthetic_seed;
        Ok(())
    }

    fn get_bar_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        date_begin: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<BarData, SourceError> {
        let key = self.series_key(symbol, timeframe);
        let step = timeframe.duration();
        let mut bars = Vec::new();

        let mut next = Some(date_begin.and_time(NaiveTime::MIN));
        while let Some(time) = next.filter(|t| t.date() <= date_end) {
            bars.push(self.make_bar(key, timeframe, time));
            next = time.checked_add_signed(step);
        }

        Ok(BarData::new(symbol, timeframe, date_begin, date_end, bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, d).unwrap()
    }

    #[test]
    fn covers_range_on_timeframe_grid() {
        let source = SyntheticSource::new();
        let data = source
            .get_bar_data("BTCUSDT", Timeframe::H1, ymd(1), ymd(2))
            .unwrap();
        assert_eq!(data.len(), 48);
        assert_eq!(data.bars()[0].time, ymd(1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(data.bars()[47].time, ymd(2).and_hms_opt(23, 0, 0).unwrap());
        assert!(data.bars().iter().all(Bar::is_sane));
    }

    #[test]
    fn bars_independent_of_requested_range() {
        let source = SyntheticSource::new();
        let narrow = source
            .get_bar_data("BTCUSDT", Timeframe::M15, ymd(5), ymd(5))
            .unwrap();
        let wide = source
            .get_bar_data("BTCUSDT", Timeframe::M15, ymd(1), ymd(9))
            .unwrap();
        let offset = 4 * Timeframe::M15.bars_per_day() as usize;
        assert_eq!(narrow.bars(), &wide.bars()[offset..offset + narrow.len()]);
    }

    #[test]
    fn seed_changes_output() {
        let mut a = SyntheticSource::new();
        let mut b = SyntheticSource::new();
        a.init(&EngineConfig::default()).unwrap();
        b.init(&EngineConfig {
            synthetic_seed: 42,
            ..EngineConfig::default()
        })
        .unwrap();
        let da = a.get_bar_data("X", Timeframe::D1, ymd(1), ymd(3)).unwrap();
        let db = b.get_bar_data("X", Timeframe::D1, ymd(1), ymd(3)).unwrap();
        assert_ne!(da.closes(), db.closes());
    }

    #[test]
    fn empty_bar_ratio() {
        let all_empty = SyntheticSource::new().with_empty_bar_ratio(1.0);
        let data = all_empty
            .get_bar_data("X", Timeframe::H1, ymd(1), ymd(1))
            .unwrap();
        assert_eq!(data.empty_bar_stats().fraction, Some(1.0));

        let none_empty = SyntheticSource::new().with_empty_bar_ratio(-3.0);
        let data = none_empty
            .get_bar_data("X", Timeframe::H1, ymd(1), ymd(1))
            .unwrap();
        assert_eq!(data.empty_bar_stats().fraction, Some(0.0));
    }

    #[test]
    fn last_representable_date_does_not_overflow() {
        let data = SyntheticSource::new()
            .get_bar_data("X", Timeframe::H1, NaiveDate::MAX, NaiveDate::MAX)
            .unwrap();
        assert_eq!(data.len(), 24);
        assert_eq!(data.bars()[23].time, NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn reversed_range_is_empty() {
        let data = SyntheticSource::new()
            .get_bar_data("X", Timeframe::D1, ymd(5), ymd(1))
            .unwrap();
        assert!(data.is_empty());
    }
}
