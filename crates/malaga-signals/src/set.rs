//! Alpha configuration and computation of the full alpha set.

use crate::mean_reversion::{MeanReversion, MeanReversionConfig};
use crate::momentum::{Momentum, MomentumConfig};
use crate::reversal::{Reversal, ReversalConfig};
use crate::value::{Value, ValueConfig};
use crate::volatility::{VolatilityRegime, VolatilityRegimeConfig};
use log::info;
use malaga_traits::{
    AlphaKind, AlphaScorer, AlphaSet, Degradation, MalagaError, PricePanel, Result, ScoreOutput,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Window settings for every alpha.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaConfig {
    /// Mean-reversion settings.
    pub mean_reversion: MeanReversionConfig,
    /// Momentum settings.
    pub momentum: MomentumConfig,
    /// Volatility regime settings.
    pub volatility_regime: VolatilityRegimeConfig,
    /// Reversal settings.
    pub reversal: ReversalConfig,
    /// Value settings.
    pub value: ValueConfig,
}

impl AlphaConfig {
    /// Checks that every window is positive.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidConfig`] naming the first zero window.
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("mean_reversion.coint_window", self.mean_reversion.coint_window),
            ("mean_reversion.z_window", self.mean_reversion.z_window),
            ("momentum.window", self.momentum.window),
            ("volatility_regime.short_window", self.volatility_regime.short_window),
            ("volatility_regime.long_window", self.volatility_regime.long_window),
            ("volatility_regime.regime_window", self.volatility_regime.regime_window),
            ("reversal.warmup", self.reversal.warmup),
            ("value.window", self.value.window),
        ];
        match windows.iter().find(|(_, w)| *w == 0) {
            Some((name, _)) => Err(MalagaError::InvalidConfig(format!(
                "{name} must be positive"
            ))),
            None => Ok(()),
        }
    }

    /// Builds the scorer for `kind`.
    pub fn scorer(&self, kind: AlphaKind) -> Box<dyn AlphaScorer> {
        match kind {
            AlphaKind::MeanReversion => Box::new(MeanReversion::new(self.mean_reversion.clone())),
            AlphaKind::Momentum => Box::new(Momentum::new(self.momentum.clone())),
            AlphaKind::VolatilityRegime => {
                Box::new(VolatilityRegime::new(self.volatility_regime.clone()))
            }
            AlphaKind::Reversal => Box::new(Reversal::new(self.reversal.clone())),
            AlphaKind::Value => Box::new(Value::new(self.value.clone())),
        }
    }
}

/// Every alpha for one price panel plus the fallbacks taken.
#[derive(Debug, Clone)]
pub struct AlphaOutput {
    /// One score panel per alpha.
    pub alphas: AlphaSet,
    /// Fallbacks taken by any scorer.
    pub degradations: Vec<Degradation>,
}

/// Scores `prices` with all five alphas in parallel.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidConfig`] for a zero window, or the first
/// scorer error.
pub fn compute_alphas(prices: &PricePanel, config: &AlphaConfig) -> Result<AlphaOutput> {
    config.validate()?;

    let outputs: Vec<ScoreOutput> = AlphaKind::ALL
        .par_iter()
        .map(|kind| config.scorer(*kind).score(prices))
        .collect::<Result<_>>()?;

    let mut panels = Vec::with_capacity(AlphaKind::COUNT);
    let mut degradations = Vec::new();
    for output in outputs {
        panels.push(output.scores);
        degradations.extend(output.degradations);
    }
    let panels = panels
        .try_into()
        .map_err(|_| MalagaError::Other("expected one score panel per alpha".to_string()))?;

    info!(
        "computed {} alphas over {} dates x {} symbols ({} fallbacks)",
        AlphaKind::COUNT,
        prices.n_dates(),
        prices.n_symbols(),
        degradations.len()
    );

    Ok(AlphaOutput {
        alphas: AlphaSet::new(panels)?,
        degradations,
    })
}
