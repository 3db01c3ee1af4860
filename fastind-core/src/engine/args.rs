//! Indicator call arguments and the cache key built from them.

use crate::domain::{DateInput, Timeframe};
use crate::error::EngineError;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single positional or keyword argument.
///
/// Floats compare and hash by bit pattern so the value can be part of a cache
/// key; `0.0` and `-0.0` are distinct keys, `NaN` equals itself.
#[derive(Debug, Clone)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArgValue::Bool(a), ArgValue::Bool(b)) => a == b,
            (ArgValue::Int(a), ArgValue::Int(b)) => a == b,
            (ArgValue::Float(a), ArgValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ArgValue::Str(a), ArgValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArgValue {}

impl Hash for ArgValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ArgValue::Bool(v) => v.hash(state),
            ArgValue::Int(v) => v.hash(state),
            ArgValue::Float(v) => v.to_bits().hash(state),
            ArgValue::Str(v) => v.hash(state),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::Int(i64::from(v))
    }
}

impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::Int(i64::from(v))
    }
}

impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::Float(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Timeframe> for ArgValue {
    fn from(v: Timeframe) -> Self {
        ArgValue::Str(v.as_str().to_string())
    }
}

/// Positional and keyword arguments of one indicator call.
///
/// Keyword arguments live in a `BTreeMap`, so their order of insertion never
/// affects equality or hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndicatorArgs {
    positional: Vec<ArgValue>,
    keyword: BTreeMap<String, ArgValue>,
}

impl IndicatorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<ArgValue>) {
        self.positional.push(value.into());
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.keyword.insert(name.into(), value.into());
    }

    pub fn positional(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn keyword(&self) -> &BTreeMap<String, ArgValue> {
        &self.keyword
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.keyword.get(name)
    }

    /// Positional string argument at `index`.
    pub fn str_at(&self, indicator: &str, index: usize, what: &str) -> Result<&str, EngineError> {
        match self.positional.get(index) {
            Some(ArgValue::Str(s)) => Ok(s),
            Some(other) => Err(EngineError::invalid_argument(
                indicator,
                format!("{what} (argument {index}) must be a string, got {other}"),
            )),
            None => Err(EngineError::invalid_argument(
                indicator,
                format!("missing {what} (argument {index})"),
            )),
        }
    }

    /// Conventional `(symbol, timeframe)` leading positional arguments.
    pub fn symbol_timeframe(&self, indicator: &str) -> Result<(&str, Timeframe), EngineError> {
        let symbol = self.str_at(indicator, 0, "symbol")?;
        let timeframe = self
            .str_at(indicator, 1, "timeframe")?
            .parse::<Timeframe>()
            .map_err(|e| EngineError::invalid_argument(indicator, e.to_string()))?;
        Ok((symbol, timeframe))
    }

    /// Keyword integer `>= 1`, or `default` when absent.
    pub fn period(
        &self,
        indicator: &str,
        name: &str,
        default: usize,
    ) -> Result<usize, EngineError> {
        match self.keyword.get(name) {
            None => Ok(default),
            Some(ArgValue::Int(v)) if *v >= 1 => usize::try_from(*v).map_err(|_| {
                EngineError::invalid_argument(indicator, format!("{name} too large: {v}"))
            }),
            Some(other) => Err(EngineError::invalid_argument(
                indicator,
                format!("{name} must be an integer >= 1, got {other}"),
            )),
        }
    }

    /// Keyword string, or `default` when absent.
    pub fn keyword_str<'a>(
        &'a self,
        indicator: &str,
        name: &str,
        default: &'a str,
    ) -> Result<&'a str, EngineError> {
        match self.keyword.get(name) {
            None => Ok(default),
            Some(ArgValue::Str(s)) => Ok(s),
            Some(other) => Err(EngineError::invalid_argument(
                indicator,
                format!("{name} must be a string, got {other}"),
            )),
        }
    }

    /// Fail on keyword arguments outside `allowed`, so typos don't silently
    /// create distinct cache entries.
    pub fn reject_unknown_keywords(
        &self,
        indicator: &str,
        allowed: &[&str],
    ) -> Result<(), EngineError> {
        match self.keyword.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unknown) => Err(EngineError::invalid_argument(
                indicator,
                format!("unexpected keyword argument '{unknown}'"),
            )),
            None => Ok(()),
        }
    }
}

/// A request for an indicator: call arguments plus the date range wanted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorCall {
    pub args: IndicatorArgs,
    pub date_begin: Option<DateInput>,
    pub date_end: Option<DateInput>,
}

impl IndicatorCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.args.push(value);
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.set(name, value);
        self
    }

    pub fn begin(mut self, date: impl Into<DateInput>) -> Self {
        self.date_begin = Some(date.into());
        self
    }

    pub fn end(mut self, date: impl Into<DateInput>) -> Self {
        self.date_end = Some(date.into());
        self
    }

    pub fn range(self, begin: impl Into<DateInput>, end: impl Into<DateInput>) -> Self {
        self.begin(begin).end(end)
    }
}

/// Identity of a computation: indicator name plus call arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    indicator: String,
    args: IndicatorArgs,
}

impl CallKey {
    pub fn new(indicator: &str, args: &IndicatorArgs) -> Self {
        Self {
            indicator: indicator.to_string(),
            args: args.clone(),
        }
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    pub fn args(&self) -> &IndicatorArgs {
        &self.args
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.indicator)?;
        let mut first = true;
        for value in &self.args.positional {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        for (name, value) in &self.args.keyword {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        f.write_str(")")
    }
}
