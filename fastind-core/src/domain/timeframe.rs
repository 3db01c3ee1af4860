//! Bar interval.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown timeframe '{0}' (expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d)")]
pub struct ParseTimeframeError(pub String);

/// Interval covered by one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    /// Length of one bar.
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// Number of bars in one calendar day.
    pub fn bars_per_day(&self) -> i64 {
        1440 / self.minutes()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == normalized)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_agree() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
            assert_eq!(tf.to_string(), tf.as_str());
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("1H".parse::<Timeframe>().unwrap(), Timeframe::H1);
        assert_eq!(" 5m ".parse::<Timeframe>().unwrap(), Timeframe::M5);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "7m".parse::<Timeframe>().unwrap_err();
        assert_eq!(err, ParseTimeframeError("7m".into()));
    }

    #[test]
    fn bars_per_day() {
        assert_eq!(Timeframe::M5.bars_per_day(), 288);
        assert_eq!(Timeframe::D1.bars_per_day(), 1);
    }

    #[test]
    fn serde_uses_short_names() {
        let json = serde_json::to_string(&Timeframe::M15).unwrap();
        assert_eq!(json, "\"15m\"");
    }
}
