//! Analysis configuration loaded from TOML.
//!
//! ```toml
//! parallel = true
//!
//! [indicators]
//! ma_window = 50
//! prefix_policy = "leave_undefined"
//!
//! [risk]
//! risk_free_rate = 0.0001
//!
//! [align]
//! utc_offset_minutes = -240
//! ```
//!
//! Every section and field is optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::align::AlignConfig;
use crate::risk::RiskParams;
use sentiquant_core::domain::ContentKey;
use sentiquant_core::fingerprint::params_key;
use sentiquant_core::indicators::{IndicatorParams, InvalidParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error(transparent)]
    Indicators(#[from] InvalidParams),

    #[error("invalid config value '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Process entities on the rayon thread pool.
    pub parallel: bool,
    pub indicators: IndicatorParams,
    pub risk: RiskParams,
    pub align: AlignConfig,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        if self.risk.volatility_window == 0 {
            return Err(ConfigError::Invalid {
                field: "risk.volatility_window",
                reason: "must be >= 1".into(),
            });
        }
        if !self.risk.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid {
                field: "risk.risk_free_rate",
                reason: "must be finite".into(),
            });
        }
        if self.align.offset().is_none() {
            return Err(ConfigError::Invalid {
                field: "align.utc_offset_minutes",
                reason: format!(
                    "must lie strictly within +/-24h, got {}",
                    self.align.utc_offset_minutes
                ),
            });
        }
        Ok(())
    }

    /// BLAKE3 key over the canonical JSON of the whole configuration.
    pub fn fingerprint(&self) -> Result<ContentKey, ConfigError> {
        params_key(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
