//! Loose date inputs and their normalization to calendar dates.

use crate::error::EngineError;
use chrono::{NaiveDate, NaiveDateTime};

/// A date-like value as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        DateInput::DateTime(dt)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Normalize an optional date input to a calendar date.
///
/// `None` stays `None`. Datetimes are truncated to their date.
pub fn parse_date_input(input: Option<&DateInput>) -> Result<Option<NaiveDate>, EngineError> {
    let Some(input) = input else {
        return Ok(None);
    };
    match input {
        DateInput::Date(d) => Ok(Some(*d)),
        DateInput::DateTime(dt) => Ok(Some(dt.date())),
        DateInput::Text(text) => parse_date_text(text).map(Some),
    }
}

fn parse_date_text(text: &str) -> Result<NaiveDate, EngineError> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| EngineError::InvalidDate(text.to_string()))
}
