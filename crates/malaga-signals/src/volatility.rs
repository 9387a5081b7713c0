//! Volatility regime alpha.

use malaga_traits::stats::{EPSILON, rolling_std, rolling_zscore};
use malaga_traits::{AlphaKind, AlphaScorer, PricePanel, Result, ScoreOutput};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration for the volatility regime alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityRegimeConfig {
    /// Short realised-volatility window (default: 20).
    pub short_window: usize,
    /// Long realised-volatility window (default: 60).
    pub long_window: usize,
    /// Window of the z-score applied to the volatility ratio (default: 60).
    pub regime_window: usize,
}

impl Default for VolatilityRegimeConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 60,
            regime_window: 60,
        }
    }
}

/// Time-series signal on the ratio of short to long realised volatility.
///
/// Each instrument is scored independently: the ratio `σ_short / (σ_long + ε)`
/// is z-scored over a trailing window, clipped to `[-2, 2]` and halved.
/// Undefined cells score 0.
#[derive(Debug, Clone, Default)]
pub struct VolatilityRegime {
    config: VolatilityRegimeConfig,
}

impl VolatilityRegime {
    /// Create a volatility regime scorer with the given configuration.
    #[must_use]
    pub const fn new(config: VolatilityRegimeConfig) -> Self {
        Self { config }
    }
}

impl AlphaScorer for VolatilityRegime {
    fn kind(&self) -> AlphaKind {
        AlphaKind::VolatilityRegime
    }

    fn lookback(&self) -> usize {
        self.config.short_window.max(self.config.long_window) + self.config.regime_window
    }

    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput> {
        let log_returns = prices.log_returns();
        let mut scores = Array2::zeros(log_returns.dim());

        for (i, returns) in log_returns.columns().into_iter().enumerate() {
            let returns = returns.to_vec();
            let short = rolling_std(&returns, self.config.short_window);
            let long = rolling_std(&returns, self.config.long_window);
            let ratio: Vec<f64> = short
                .iter()
                .zip(&long)
                .map(|(s, l)| s / (l + EPSILON))
                .collect();
            let z = rolling_zscore(&ratio, self.config.regime_window);
            for (t, z) in z.into_iter().enumerate() {
                if z.is_finite() {
                    scores[[t, i]] = z.clamp(-2.0, 2.0) / 2.0;
                }
            }
        }

        Ok(ScoreOutput::new(prices.panel().with_values(scores)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{noise, panel_from_columns, random_walk};

    fn small() -> VolatilityRegime {
        VolatilityRegime::new(VolatilityRegimeConfig {
            short_window: 5,
            long_window: 20,
            regime_window: 20,
        })
    }

    #[test]
    fn test_volatility_burst_scores_positive() {
        let n = 120;
        let mut level = 100f64.ln();
        let series: Vec<f64> = (0..n)
            .map(|t| {
                let vol = if t >= 100 { 0.08 } else { 0.005 };
                if t > 0 {
                    level += vol * noise(t);
                }
                level.exp()
            })
            .collect();
        let prices = panel_from_columns(&[series]);
        let out = small().score(&prices).unwrap();
        assert!((100..110).any(|t| out.scores.get(t, 0).unwrap() > 0.5));
    }

    #[test]
    fn test_warmup_is_neutral_and_bounded() {
        let prices = panel_from_columns(&[
            random_walk(50.0, 150, 0.03, 1),
            random_walk(80.0, 150, 0.01, 2),
        ]);
        let out = small().score(&prices).unwrap();
        for t in 0..20 {
            assert_eq!(out.scores.get(t, 0), Some(0.0));
        }
        assert!(out.scores.values().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_constant_prices_score_zero() {
        let prices = panel_from_columns(&[vec![10.0; 100], vec![12.0; 100]]);
        let out = small().score(&prices).unwrap();
        assert!(out.scores.values().iter().all(|v| *v == 0.0));
    }
}
