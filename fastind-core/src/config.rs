//! Engine configuration.
//!
//! A base [`EngineConfig`] (defaults, or loaded from TOML) is merged with
//! per-engine [`ConfigOverrides`] once, at construction. The merged config is
//! immutable for the lifetime of the engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{key} out of range: {value} (valid: {valid})")]
    OutOfRange {
        key: &'static str,
        value: String,
        valid: &'static str,
    },
}

/// Options resolved once per engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject series whose first or last bar has a zero close.
    pub endpoints_required: bool,
    /// Upper bound on the share of zero-volume bars; `None` disables the check.
    pub max_empty_bars_fraction: Option<f64>,
    /// Upper bound on consecutive zero-volume bars; `None` disables the check.
    pub max_empty_bars_consecutive: Option<usize>,
    /// Repair zero-volume bars before indicators see them.
    pub restore_empty_bars: bool,
    /// Directory for the `csv` data source.
    pub csv_dir: Option<PathBuf>,
    /// Seed for the `synthetic` data source.
    pub synthetic_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoints_required: true,
            max_empty_bars_fraction: None,
            max_empty_bars_consecutive: None,
            restore_empty_bars: true,
            csv_dir: None,
            synthetic_seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(fraction) = self.max_empty_bars_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(ConfigError::OutOfRange {
                    key: "max_empty_bars_fraction",
                    value: fraction.to_string(),
                    valid: "0.0..=1.0",
                });
            }
        }
        Ok(())
    }

    /// Apply overrides on top of this config. Overrides win; no deep merge.
    pub fn merged(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = self.clone();
        if let Some(v) = overrides.endpoints_required {
            config.endpoints_required = v;
        }
        if let Some(v) = overrides.max_empty_bars_fraction {
            config.max_empty_bars_fraction = v;
        }
        if let Some(v) = overrides.max_empty_bars_consecutive {
            config.max_empty_bars_consecutive = v;
        }
        if let Some(v) = overrides.restore_empty_bars {
            config.restore_empty_bars = v;
        }
        if let Some(v) = &overrides.csv_dir {
            config.csv_dir = v.clone();
        }
        if let Some(v) = overrides.synthetic_seed {
            config.synthetic_seed = v;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Per-engine overrides. `None` keeps the base value.
///
/// Nullable options use a nested `Option` so an override can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub endpoints_required: Option<bool>,
    pub max_empty_bars_fraction: Option<Option<f64>>,
    pub max_empty_bars_consecutive: Option<Option<usize>>,
    pub restore_empty_bars: Option<bool>,
    pub csv_dir: Option<Option<PathBuf>>,
    pub synthetic_seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints_required(mut self, value: bool) -> Self {
        self.endpoints_required = Some(value);
        self
    }

    pub fn max_empty_bars_fraction(mut self, value: Option<f64>) -> Self {
        self.max_empty_bars_fraction = Some(value);
        self
    }

    pub fn max_empty_bars_consecutive(mut self, value: Option<usize>) -> Self {
        self.max_empty_bars_consecutive = Some(value);
        self
    }

    pub fn restore_empty_bars(mut self, value: bool) -> Self {
        self.restore_empty_bars = Some(value);
        self
    }

    pub fn csv_dir(mut self, value: Option<PathBuf>) -> Self {
        self.csv_dir = Some(value);
        self
    }

    pub fn synthetic_seed(mut self, value: u64) -> Self {
        self.synthetic_seed = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
