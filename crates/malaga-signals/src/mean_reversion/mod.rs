//! Cointegration spread mean-reversion alpha.
//!
//! A cointegrating vector `w` is estimated once on the leading fit window of
//! log prices. The spread `s[t] = Σ w_i ln p_i[t]` is z-scored over a trailing
//! window, and each instrument is pushed against the spread in proportion to
//! the sign of its weight: `score_i = -sign(w_i) · clip(z, -2, 2) / 2`.
//!
//! Dates inside the fit window (before its last row) have no score, since
//! the weights were estimated with data from their future.

pub mod johansen;

use log::{debug, warn};
use malaga_traits::stats::rolling_zscore;
use malaga_traits::{
    AlphaKind, AlphaScorer, Degradation, Fitted, PricePanel, Result, ScoreOutput,
};
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};

/// Configuration for the mean-reversion alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// Leading rows used to estimate the cointegrating vector (default: 756).
    pub coint_window: usize,
    /// Trailing window of the spread z-score (default: 60).
    pub z_window: usize,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            coint_window: 756,
            z_window: 60,
        }
    }
}

/// Mean-reversion scorer on the universe's cointegration spread.
#[derive(Debug, Clone, Default)]
pub struct MeanReversion {
    config: MeanReversionConfig,
}

impl MeanReversion {
    /// Create a mean-reversion scorer with the given configuration.
    #[must_use]
    pub const fn new(config: MeanReversionConfig) -> Self {
        Self { config }
    }

    /// Number of leading rows the weights are fitted on.
    pub fn fit_rows(&self, prices: &PricePanel) -> usize {
        prices.n_dates().min(self.config.coint_window)
    }

    /// Estimates the spread weights on the fit window.
    pub fn fit(&self, prices: &PricePanel) -> Fitted<Array1<f64>> {
        let rows = self.fit_rows(prices);
        let log_prices = prices.log_prices();
        johansen::cointegrating_vector(log_prices.slice(s![..rows, ..]))
    }

    /// The spread `Σ w_i ln p_i[t]`, `NaN` where any price is missing.
    pub fn spread(prices: &PricePanel, weights: &Array1<f64>) -> Vec<f64> {
        prices
            .log_prices()
            .rows()
            .into_iter()
            .map(|row| row.dot(weights))
            .collect()
    }
}

const fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl AlphaScorer for MeanReversion {
    fn kind(&self) -> AlphaKind {
        AlphaKind::MeanReversion
    }

    fn lookback(&self) -> usize {
        self.config.coint_window.max(self.config.z_window)
    }

    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput> {
        let mut degradations = Vec::new();
        let fitted = self.fit(prices);
        match &fitted {
            Fitted::Estimated(w) => debug!("mean reversion weights: {w}"),
            Fitted::Degraded { value, reason } => {
                warn!("mean reversion fit degraded ({reason}), using fallback weights {value}");
                degradations.push(Degradation::new(self.name(), reason.clone()));
            }
        }
        let weights = fitted.into_value();

        let z = rolling_zscore(&Self::spread(prices, &weights), self.config.z_window);
        let first_live = self.fit_rows(prices).saturating_sub(1);
        let mut scores = Array2::from_elem((prices.n_dates(), prices.n_symbols()), f64::NAN);
        for (t, z) in z.iter().enumerate().skip(first_live) {
            if !z.is_finite() {
                continue;
            }
            let pull = z.clamp(-2.0, 2.0) / 2.0;
            for (i, w) in weights.iter().enumerate() {
                scores[[t, i]] = -sign(*w) * pull;
            }
        }

        Ok(ScoreOutput {
            scores: prices.panel().with_values(scores)?,
            degradations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{noise, panel_from_columns, random_walk};
    use malaga_traits::DegradeReason;

    fn pair(n: usize) -> PricePanel {
        let base = random_walk(100.0, n, 0.02, 5);
        let partner: Vec<f64> = base
            .iter()
            .enumerate()
            .map(|(t, p)| p * (0.01 * noise(t * 13 + 1)).exp())
            .collect();
        panel_from_columns(&[base, partner])
    }

    fn scorer(coint_window: usize, z_window: usize) -> MeanReversion {
        MeanReversion::new(MeanReversionConfig {
            coint_window,
            z_window,
        })
    }

    #[test]
    fn test_in_sample_dates_are_missing() {
        let prices = pair(300);
        let out = scorer(200, 20).score(&prices).unwrap();
        for t in 0..199 {
            assert!(out.scores.get(t, 0).is_none(), "date {t} is in-sample");
        }
        assert!(out.scores.get(199, 0).is_some());
        assert!(out.degradations.is_empty());
    }

    #[test]
    fn test_scores_oppose_weight_signs() {
        let prices = pair(300);
        let mr = scorer(200, 20);
        let w = mr.fit(&prices).into_value();
        let out = mr.score(&prices).unwrap();
        for t in 199..300 {
            let (a, b) = (out.scores.get(t, 0).unwrap(), out.scores.get(t, 1).unwrap());
            assert!((-1.0..=1.0).contains(&a));
            if a != 0.0 && sign(w[0]) != sign(w[1]) {
                assert!(a * b < 0.0);
            }
        }
    }

    #[test]
    fn test_truncation_does_not_change_past_scores() {
        let prices = pair(300);
        let mr = scorer(150, 20);
        let full = mr.score(&prices).unwrap();

        let cut = 240;
        let truncated = PricePanel::new(
            prices.dates()[..cut].to_vec(),
            prices.symbols().to_vec(),
            prices.values().slice(s![..cut, ..]).to_owned(),
        )
        .unwrap();
        let partial = mr.score(&truncated).unwrap();
        for t in 0..cut {
            for i in 0..2 {
                assert_eq!(full.scores.get(t, i), partial.scores.get(t, i));
            }
        }
    }

    #[test]
    fn test_short_history_degrades_and_reports() {
        let prices = pair(5);
        let out = scorer(756, 2).score(&prices).unwrap();
        assert_eq!(out.degradations.len(), 1);
        assert_eq!(out.degradations[0].source, "mean_reversion");
        assert!(matches!(
            out.degradations[0].reason,
            DegradeReason::InsufficientData { .. }
        ));
        assert!(out.scores.get(4, 0).is_some());
    }
}
