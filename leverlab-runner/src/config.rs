//! Serializable analysis configuration (TOML).
//!
//! ```toml
//! [ledger]
//! path = "data/aggr.csv"
//!
//! [filter]
//! exchange = "Bitmex"
//! leverage = "1"
//! start = "2018-01-01"
//! end = "2019-12-31"
//! strict = false
//!
//! [output]
//! dir = "results"
//! ```
//!
//! Every section and key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use leverlab_core::FilterMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{DEFAULT_EXCHANGE, DEFAULT_LEVERAGE};
use crate::selection::{parse_timestamp, FilterSelection};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("filter.{field}: unparseable timestamp '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub ledger: LedgerSection,
    pub filter: FilterSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub exchange: String,
    /// Kept as text so a malformed value surfaces as a validation error at
    /// analysis time, like any other user input.
    pub leverage: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub strict: bool,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            exchange: DEFAULT_EXCHANGE.to_string(),
            leverage: DEFAULT_LEVERAGE.to_string(),
            start: None,
            end: None,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// The filter section as a selection, with timestamps parsed.
    pub fn selection(&self) -> Result<FilterSelection, ConfigError> {
        let parse = |field: &'static str, value: &Option<String>| {
            value
                .as_deref()
                .map(|v| {
                    parse_timestamp(v).ok_or_else(|| ConfigError::InvalidTimestamp {
                        field,
                        value: v.to_string(),
                    })
                })
                .transpose()
        };
        Ok(
            FilterSelection::new(self.filter.exchange.clone(), self.filter.leverage.clone())
                .with_range(parse("start", &self.filter.start)?, parse("end", &self.filter.end)?),
        )
    }

    pub fn mode(&self) -> FilterMode {
        if self.filter.strict {
            FilterMode::Strict
        } else {
            FilterMode::Lenient
        }
    }
}
