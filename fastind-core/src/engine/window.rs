//! The engine's tracked date window.

use crate::error::EngineError;
use chrono::NaiveDate;

/// Overall `[begin, end]` range covered by cached results. Only ever widens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    begin: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Option<NaiveDate> {
        self.begin
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Both bounds, or `DateWindowUndefined` if either is unset.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate), EngineError> {
        match (self.begin, self.end) {
            (Some(begin), Some(end)) => Ok((begin, end)),
            _ => Err(EngineError::DateWindowUndefined),
        }
    }

    /// The window after absorbing the given bounds. A bound only moves if it
    /// extends the window (begin earlier, end later).
    pub fn widened(&self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let begin = match (self.begin, begin) {
            (Some(current), Some(requested)) => Some(current.min(requested)),
            (current, requested) => current.or(requested),
        };
        let end = match (self.end, end) {
            (Some(current), Some(requested)) => Some(current.max(requested)),
            (current, requested) => current.or(requested),
        };
        Self { begin, end }
    }

    /// Widen in place. Returns whether anything changed.
    ///
    /// Fails with `InvalidDateRange` (window untouched) if the widened window
    /// would have begin after end.
    pub fn extend(
        &mut self,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool, EngineError> {
        let widened = self.widened(begin, end);
        if let (Some(begin), Some(end)) = (widened.begin, widened.end) {
            if begin > end {
                return Err(EngineError::InvalidDateRange { begin, end });
            }
        }
        let changed = widened != *self;
        *self = widened;
        Ok(changed)
    }
}
