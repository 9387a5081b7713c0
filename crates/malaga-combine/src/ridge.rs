//! Ridge-regression signal combination.

use crate::combiner::Combiner;
use crate::model::LambdaModel;
use log::{info, warn};
use malaga_traits::linalg::ridge;
use malaga_traits::{
    AlphaKind, AlphaSet, DegradeReason, Fitted, MalagaError, PricePanel, Result,
};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Configuration for the ridge combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeConfig {
    /// L2 penalty (default: 1.0).
    pub alpha: f64,
    /// Forward-return horizon in periods (default: 1).
    pub horizon: usize,
    /// Fewest complete rows needed to fit; below this the model is equal-weight (default: 252).
    pub min_rows: usize,
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            horizon: 1,
            min_rows: 252,
        }
    }
}

impl RidgeConfig {
    /// Checks the penalty and horizon.
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "ridge alpha must be a non-negative number, got {}",
                self.alpha
            )));
        }
        if self.horizon == 0 {
            return Err(MalagaError::InvalidConfig(
                "ridge horizon must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Regresses the forward return on the alpha scores, without intercept.
///
/// Training rows are the `(date, symbol)` cells where every alpha and the
/// forward return `p[t+h] / p[t] - 1` are present. Fewer than `min_rows`
/// such rows, or a system that is not positive definite, yield the
/// equal-weight model tagged as degraded.
///
/// The fit uses every date of the panel, so combined scores of a ridge run
/// are in-sample. Use [`crate::EqualWeightCombiner`] when scores must depend
/// only on past prices.
#[derive(Debug, Clone, Default)]
pub struct RidgeCombiner {
    config: RidgeConfig,
}

impl RidgeCombiner {
    /// Create a ridge combiner with the given configuration.
    #[must_use]
    pub const fn new(config: RidgeConfig) -> Self {
        Self { config }
    }

    /// Complete-case design matrix and target.
    pub fn training_set(&self, alphas: &AlphaSet, prices: &PricePanel) -> (Array2<f64>, Array1<f64>) {
        let h = self.config.horizon;
        let (n_dates, n_symbols) = (prices.n_dates(), prices.n_symbols());
        let mut rows: Vec<f64> = Vec::new();
        let mut target: Vec<f64> = Vec::new();

        for t in 0..n_dates.saturating_sub(h) {
            for i in 0..n_symbols {
                let forward = match (prices.get(t + h, i), prices.get(t, i)) {
                    (Some(later), Some(now)) => later / now - 1.0,
                    _ => continue,
                };
                let scores: Option<Vec<f64>> =
                    alphas.iter().map(|(_, panel)| panel.get(t, i)).collect();
                if let Some(scores) = scores {
                    rows.extend(scores);
                    target.push(forward);
                }
            }
        }

        let n = target.len();
        let x = Array2::from_shape_vec((n, AlphaKind::COUNT), rows)
            .unwrap_or_else(|_| Array2::zeros((0, AlphaKind::COUNT)));
        (x, Array1::from(target))
    }
}

impl Combiner for RidgeCombiner {
    fn fit(&self, alphas: &AlphaSet, prices: &PricePanel) -> Result<Fitted<LambdaModel>> {
        self.config.validate()?;
        prices
            .panel()
            .ensure_same_index(alphas.get(AlphaKind::Momentum), "alpha set")?;

        let (x, y) = self.training_set(alphas, prices);
        if y.len() < self.config.min_rows {
            let reason = DegradeReason::InsufficientData {
                required: self.config.min_rows,
                available: y.len(),
            };
            warn!("ridge combiner degraded ({reason}), using equal weights");
            return Ok(Fitted::degraded(LambdaModel::equal(), reason));
        }

        let Some(beta) = ridge(&x, &y, self.config.alpha) else {
            warn!("ridge combiner degraded (singular system), using equal weights");
            return Ok(Fitted::degraded(LambdaModel::equal(), DegradeReason::Singular));
        };

        let mut lambdas = [0.0; AlphaKind::COUNT];
        for (slot, b) in lambdas.iter_mut().zip(beta.iter()) {
            *slot = *b;
        }
        let summary: Vec<String> = AlphaKind::ALL
            .iter()
            .zip(&lambdas)
            .map(|(kind, l)| format!("{}={l:.6}", kind.code()))
            .collect();
        info!(
            "ridge lambdas fitted on {} rows: {}",
            y.len(),
            summary.join(", ")
        );
        Ok(Fitted::Estimated(LambdaModel::new(lambdas)))
    }

    fn name(&self) -> &str {
        "ridge"
    }
}
