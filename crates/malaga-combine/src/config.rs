//! Combiner selection.

use crate::combiner::Combiner;
use crate::equal_weight::EqualWeightCombiner;
use crate::ridge::{RidgeCombiner, RidgeConfig};
use malaga_traits::Result;
use serde::{Deserialize, Serialize};

/// How alpha weights are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMethod {
    /// Ridge regression of forward returns on alpha scores.
    #[default]
    Ridge,
    /// `1/K` on every alpha.
    EqualWeight,
}

/// Combiner settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Which combiner to use.
    pub method: CombineMethod,
    /// Ridge settings, used when `method` is `ridge`.
    pub ridge: RidgeConfig,
}

impl CombineConfig {
    /// Validates the settings of the selected method.
    pub fn validate(&self) -> Result<()> {
        match self.method {
            CombineMethod::Ridge => self.ridge.validate(),
            CombineMethod::EqualWeight => Ok(()),
        }
    }

    /// Builds the configured combiner.
    pub fn build(&self) -> Box<dyn Combiner> {
        match self.method {
            CombineMethod::Ridge => Box::new(RidgeCombiner::new(self.ridge.clone())),
            CombineMethod::EqualWeight => Box::new(EqualWeightCombiner),
        }
    }
}
