//! Short-term cross-sectional reversal.

use crate::rank::rank_rows;
use malaga_traits::{AlphaKind, AlphaScorer, PricePanel, Result, ScoreOutput};
use ndarray::s;
use serde::{Deserialize, Serialize};

/// Configuration for the reversal alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReversalConfig {
    /// Number of leading dates forced to a neutral score (default: 20).
    pub warmup: usize,
}

impl Default for ReversalConfig {
    fn default() -> Self {
        Self { warmup: 20 }
    }
}

/// Ranks the negated one-period simple return: yesterday's losers score high.
#[derive(Debug, Clone, Default)]
pub struct Reversal {
    config: ReversalConfig,
}

impl Reversal {
    /// Create a reversal scorer with the given configuration.
    #[must_use]
    pub const fn new(config: ReversalConfig) -> Self {
        Self { config }
    }
}

impl AlphaScorer for Reversal {
    fn kind(&self) -> AlphaKind {
        AlphaKind::Reversal
    }

    fn lookback(&self) -> usize {
        self.config.warmup
    }

    fn score(&self, prices: &PricePanel) -> Result<ScoreOutput> {
        let raw = prices.simple_returns().into_values().mapv(|r| -r);
        let mut ranked = rank_rows(&raw);
        let warmup = self.config.warmup.min(ranked.nrows());
        ranked.slice_mut(s![..warmup, ..]).fill(0.0);
        Ok(ScoreOutput::new(prices.panel().with_values(ranked)?))
    }
}
