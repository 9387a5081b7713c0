//! Run configuration.
//!
//! A [`RunConfig`] gathers the settings of every stage. All sections are
//! optional in TOML and fall back to their defaults:
//!
//! ```toml
//! [alphas.momentum]
//! window = 60
//!
//! [combine]
//! method = "ridge"
//!
//! [combine.ridge]
//! alpha = 1.0
//!
//! [weights]
//! threshold = 0.2
//!
//! [simulation]
//! mode = "discrete"
//! ```

use malaga_combine::CombineConfig;
use malaga_eval::{MetricsConfig, SimulationConfig, WeightConfig};
use malaga_signals::AlphaConfig;
use malaga_traits::{MalagaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Alpha scorer windows.
    pub alphas: AlphaConfig,
    /// Signal combination.
    pub combine: CombineConfig,
    /// Weight construction.
    pub weights: WeightConfig,
    /// Portfolio simulation.
    pub simulation: SimulationConfig,
    /// Performance metrics.
    pub metrics: MetricsConfig,
}

impl RunConfig {
    /// Parses a TOML document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidConfig`] for malformed TOML or invalid
    /// settings.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| MalagaError::InvalidConfig(format!("parse config TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Serialises the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MalagaError::InvalidConfig(format!("serialize config: {e}")))
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<()> {
        self.alphas.validate()?;
        self.combine.validate()?;
        self.weights.validate()?;
        self.simulation.validate()?;
        self.metrics.validate()
    }
}
