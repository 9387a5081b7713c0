//! Volatility-adjusted momentum.

use crate::rank::rank_rows;
use malaga_traits::stats::{EPSILON, TRADING_DAYS, rolling_std};
use malaga_traits::{AlphaKind, AlphaScorer, PricePanel, Result, ScoreOutput};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration for the momentum alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Trailing window in trading days (default: 60).
    pub window: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self { window: 60 }
    }
}

/// Trailing log return divided by annualised realised volatility, ranked
/// across the universe each date.
///
/// The raw value at `t` is `ln(p[t] / p[t-W]) / (σ·√252 + 1e-6)` where σ is
/// the sample deviation of the `W` daily log returns ending at `t`. Dates
/// before `W` score 0.
#[derive(Debug, Clone, Default)]
pub struct Momentum {
    config: MomentumConfig,
}

impl Momentum {
    /// Create a momentum scorer with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Unranked volatility-adjusted returns, `NaN` where undefined.
    pub fn raw(&self, prices: &PricePanel) -> Array2<f64> {
        let w = self.config.window;
        let log_prices = prices.log_prices();
        let log_returns = prices.log_returns();
        let (n_dates, n_symbols) = log_prices.dim();
        let annualise = TRADING_DAYS.sqrt();

        let mut raw = Array2::from_elem((n_dates, n_symbols), f64::NAN);
        for i in 0..n_symbols {
            let returns = log_returns.column(i).to_vec();
            let vol = rolling_std(&returns, w);
            for t in w..n_dates {
                let trailing = log_prices[[t, i]] - log_prices[[t - w, i]];
                raw[[t, i]] = trailing / vol[t].mul_add(annualise, EPSILON);
            }
        }
        raw
    }
}

impl AlphaScorer for Momentum {
    fn kind(&self) -> AlphaKind {
        AlphaKind::Momentum
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput> {
        let scores = prices.panel().with_values(rank_rows(&self.raw(prices)))?;
        Ok(ScoreOutput::new(scores))
    }
}
