//! Range-position value alpha.

use crate::rank::rank_rows;
use malaga_traits::stats::{EPSILON, rolling_max, rolling_min};
use malaga_traits::{AlphaKind, AlphaScorer, PricePanel, Result, ScoreOutput};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration for the value alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// Trailing range window in trading days (default: 252).
    pub window: usize,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self { window: 252 }
    }
}

/// Cheapness relative to the trailing trading range.
///
/// `%B = (p - min_N) / (max_N - min_N + ε)` places the price inside its
/// `N`-day range; the negated `%B` is ranked so instruments near their low
/// score high.
#[derive(Debug, Clone, Default)]
pub struct Value {
    config: ValueConfig,
}

impl Value {
    /// Create a value scorer with the given configuration.
    #[must_use]
    pub const fn new(config: ValueConfig) -> Self {
        Self { config }
    }
}

impl AlphaScorer for Value {
    fn kind(&self) -> AlphaKind {
        AlphaKind::Value
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput> {
        let window = self.config.window;
        let values = prices.values();
        let mut raw = Array2::from_elem(values.dim(), f64::NAN);

        for (i, column) in values.columns().into_iter().enumerate() {
            let series = column.to_vec();
            let lo = rolling_min(&series, window);
            let hi = rolling_max(&series, window);
            for t in 0..series.len() {
                let pct_b = (series[t] - lo[t]) / (hi[t] - lo[t] + EPSILON);
                raw[[t, i]] = -pct_b;
            }
        }

        let scores = prices.panel().with_values(rank_rows(&raw))?;
        Ok(ScoreOutput::new(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::panel_from_columns;

    #[test]
    fn test_near_low_scores_high() {
        let n = 40;
        let falling: Vec<f64> = (0..n).map(|t| 200.0 - t as f64).collect();
        let rising: Vec<f64> = (0..n).map(|t| 100.0 + t as f64).collect();
        let mut middle: Vec<f64> = (0..n)
            .map(|t| if t % 2 == 0 { 100.0 } else { 120.0 })
            .collect();
        middle[n - 1] = 110.0;
        let prices = panel_from_columns(&[falling, rising, middle]);

        let out = Value::new(ValueConfig { window: 10 }).score(&prices).unwrap();
        let last = n - 1;
        assert_eq!(out.scores.get(last, 0), Some(1.0));
        assert_eq!(out.scores.get(last, 1), Some(-1.0));
        assert_eq!(out.scores.get(last, 2), Some(0.0));
    }

    #[test]
    fn test_before_window_is_neutral() {
        let prices = panel_from_columns(&[
            (0..30).map(|t| 10.0 + t as f64).collect(),
            (0..30).map(|t| 50.0 - t as f64).collect(),
        ]);
        let out = Value::new(ValueConfig { window: 10 }).score(&prices).unwrap();
        for t in 0..9 {
            assert_eq!(out.scores.get(t, 0), Some(0.0));
        }
        assert_eq!(out.scores.get(9, 0), Some(-1.0));
    }
}
