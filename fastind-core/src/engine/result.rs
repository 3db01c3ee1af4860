//! Computed indicator series and read-only views onto them.

use crate::error::EngineError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::ops::Range;
use std::sync::Arc;

/// Full-window output of one indicator computation.
///
/// One timestamp axis shared by one or more named series. Frozen once built:
/// there are no `&mut` accessors, and the engine shares it through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorResult {
    indicator: String,
    times: Vec<NaiveDateTime>,
    series: Vec<(String, Vec<f64>)>,
}

impl IndicatorResult {
    pub fn builder(
        indicator: impl Into<String>,
        times: Vec<NaiveDateTime>,
    ) -> IndicatorResultBuilder {
        IndicatorResultBuilder {
            indicator: indicator.into(),
            times,
            series: Vec::new(),
        }
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Series names in the order the routine declared them.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|(n, _)| n.as_str())
    }

    /// Index range of bars dated on `begin..=end` (whole `end` day included).
    /// An unset bound leaves that side open.
    pub fn index_range(&self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Range<usize> {
        let start = begin.map_or(0, |b| {
            let from = b.and_time(NaiveTime::MIN);
            self.times.partition_point(|t| *t < from)
        });
        // No day after NaiveDate::MAX: the end stays open.
        let stop = match end.and_then(|e| e.succ_opt()) {
            Some(next) => {
                let until = next.and_time(NaiveTime::MIN);
                self.times.partition_point(|t| *t < until)
            }
            None => self.times.len(),
        };
        start..stop.max(start)
    }
}

/// Assembles an [`IndicatorResult`], checking every series against the time axis.
#[derive(Debug, Clone)]
pub struct IndicatorResultBuilder {
    indicator: String,
    times: Vec<NaiveDateTime>,
    series: Vec<(String, Vec<f64>)>,
}

impl IndicatorResultBuilder {
    pub fn series(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push((name.into(), values));
        self
    }

    pub fn build(self) -> Result<IndicatorResult, EngineError> {
        let invalid = |message: String| EngineError::InvalidResult {
            indicator: self.indicator.clone(),
            message,
        };

        if self.times.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("timestamps are not strictly increasing".into()));
        }
        for (i, (name, values)) in self.series.iter().enumerate() {
            if values.len() != self.times.len() {
                return Err(invalid(format!(
                    "series '{name}' has {} values for {} timestamps",
                    values.len(),
                    self.times.len()
                )));
            }
            if self.series[..i].iter().any(|(other, _)| other == name) {
                return Err(invalid(format!("duplicate series '{name}'")));
            }
        }

        Ok(IndicatorResult {
            indicator: self.indicator,
            times: self.times,
            series: self.series,
        })
    }
}

/// Read-only window onto a shared [`IndicatorResult`].
///
/// Views of the same cached result share storage; only the index range differs.
/// Neither the view nor the result behind it can be written through:
///
/// ```compile_fail
/// use fastind_core::engine::IndicatorView;
///
/// fn overwrite(view: &IndicatorView) {
///     view.series("close").unwrap()[0] = 1.0;
/// }
/// ```
///
/// ```compile_fail
/// use fastind_core::engine::{IndicatorResult, IndicatorView};
/// use std::sync::Arc;
///
/// fn overwrite(view: &IndicatorView) {
///     let mut shared = Arc::clone(view.shared());
///     let result: &mut IndicatorResult = &mut *shared;
/// }
/// ```
///
/// ```compile_fail
/// use fastind_core::engine::IndicatorResult;
///
/// fn overwrite(result: &mut IndicatorResult) {
///     result.times.clear();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IndicatorView {
    result: Arc<IndicatorResult>,
    range: Range<usize>,
}

impl IndicatorView {
    /// View of `result` restricted to bars dated on `begin..=end`.
    pub fn slice(
        result: Arc<IndicatorResult>,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        let range = result.index_range(begin, end);
        Self { result, range }
    }

    pub fn indicator(&self) -> &str {
        self.result.indicator()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.result.times()[self.range.clone()]
    }

    pub fn series(&self, name: &str) -> Option<&[f64]> {
        self.result.series(name).map(|values| &values[self.range.clone()])
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.result.series_names()
    }

    /// The full-window result this view slices.
    pub fn shared(&self) -> &Arc<IndicatorResult> {
        &self.result
    }

    /// Position of this view within the full result.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, d).unwrap()
    }

    /// Four 6-hourly timestamps per day over July 1..=4.
    fn sample() -> IndicatorResult {
        let times: Vec<NaiveDateTime> = (0..16)
            .map(|i| ymd(1).and_hms_opt(0, 0, 0).unwrap() + Duration::hours(6 * i))
            .collect();
        let values: Vec<f64> = (0..16).map(f64::from).collect();
        IndicatorResult::builder("TEST", times)
            .series("value", values)
            .build()
            .unwrap()
    }

    #[test]
    fn build_rejects_length_mismatch() {
        let times = vec![ymd(1).and_hms_opt(0, 0, 0).unwrap()];
        let err = IndicatorResult::builder("TEST", times)
            .series("value", vec![1.0, 2.0])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidResult { ref indicator, .. } if indicator == "TEST"
        ));
    }

    #[test]
    fn build_rejects_unsorted_times() {
        let t = ymd(1).and_hms_opt(0, 0, 0).unwrap();
        let err = IndicatorResult::builder("TEST", vec![t, t])
            .series("value", vec![1.0, 2.0])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn build_rejects_duplicate_series() {
        let t = ymd(1).and_hms_opt(0, 0, 0).unwrap();
        let err = IndicatorResult::builder("TEST", vec![t])
            .series("value", vec![1.0])
            .series("value", vec![2.0])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn slice_includes_whole_end_day() {
        let view = IndicatorView::slice(Arc::new(sample()), Some(ymd(2)), Some(ymd(3)));
        assert_eq!(view.len(), 8);
        assert_eq!(view.times()[0], ymd(2).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(view.times()[7], ymd(3).and_hms_opt(18, 0, 0).unwrap());
        assert_eq!(view.series("value").unwrap()[0], 4.0);
    }

    #[test]
    fn open_bounds_cover_everything() {
        let view = IndicatorView::slice(Arc::new(sample()), None, None);
        assert_eq!(view.len(), 16);
        assert_eq!(view.range(), 0..16);
    }

    #[test]
    fn last_representable_end_date_stays_open() {
        let view = IndicatorView::slice(Arc::new(sample()), Some(ymd(3)), Some(NaiveDate::MAX));
        assert_eq!(view.range(), 8..16);
    }

    #[test]
    fn out_of_range_slice_is_empty() {
        let view = IndicatorView::slice(Arc::new(sample()), Some(ymd(10)), Some(ymd(12)));
        assert!(view.is_empty());
        assert_eq!(view.series("value").unwrap().len(), 0);
    }

    #[test]
    fn views_share_storage() {
        let shared = Arc::new(sample());
        let a = IndicatorView::slice(Arc::clone(&shared), Some(ymd(1)), Some(ymd(1)));
        let b = IndicatorView::slice(Arc::clone(&shared), Some(ymd(4)), None);
        assert!(Arc::ptr_eq(a.shared(), b.shared()));
        assert_eq!(a.series_names().collect::<Vec<_>>(), vec!["value"]);
        assert!(a.series("missing").is_none());
    }
}
