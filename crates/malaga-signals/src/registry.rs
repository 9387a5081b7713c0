//! Alpha registry for discovering and categorizing the available alphas.

use malaga_traits::AlphaKind;
use serde::{Deserialize, Serialize};

/// Alpha category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlphaCategory {
    /// Trend-following signals
    Momentum,
    /// Mean reversion and contrarian signals
    Reversion,
    /// Volatility state signals
    Volatility,
    /// Price-level valuation signals
    Value,
}

impl AlphaCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Price momentum and trend-following signals",
            Self::Reversion => "Mean reversion and contrarian signals",
            Self::Volatility => "Realised volatility regime signals",
            Self::Value => "Price position relative to its historical range",
        }
    }
}

/// Metadata about an alpha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaInfo {
    /// Which alpha
    pub kind: AlphaKind,

    /// Column prefix in exported tables
    pub code: &'static str,

    /// Category classification
    pub category: AlphaCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Typical lookback with default settings, in trading days
    pub typical_lookback: usize,

    /// Whether scores are cross-sectional ranks (as opposed to per-instrument)
    pub cross_sectional: bool,
}

/// Get information about all available alphas, in export order.
#[must_use]
pub fn available_alphas() -> Vec<AlphaInfo> {
    AlphaKind::ALL.into_iter().map(info).collect()
}

fn info(kind: AlphaKind) -> AlphaInfo {
    let (category, description, typical_lookback, cross_sectional) = match kind {
        AlphaKind::MeanReversion => (
            AlphaCategory::Reversion,
            "Z-score of the Johansen cointegration spread, traded against",
            756,
            false,
        ),
        AlphaKind::Momentum => (
            AlphaCategory::Momentum,
            "60-day log return over annualised volatility, ranked",
            60,
            true,
        ),
        AlphaKind::VolatilityRegime => (
            AlphaCategory::Volatility,
            "Z-scored ratio of 20-day to 60-day realised volatility",
            120,
            false,
        ),
        AlphaKind::Reversal => (
            AlphaCategory::Reversion,
            "Negated one-day return, ranked",
            20,
            true,
        ),
        AlphaKind::Value => (
            AlphaCategory::Value,
            "Negated position within the 252-day price range, ranked",
            252,
            true,
        ),
    };
    AlphaInfo {
        kind,
        code: kind.code(),
        category,
        description,
        typical_lookback,
        cross_sectional,
    }
}

/// Get all alphas in a specific category.
#[must_use]
pub fn alphas_by_category(category: AlphaCategory) -> Vec<AlphaInfo> {
    available_alphas()
        .into_iter()
        .filter(|info| info.category == category)
        .collect()
}

/// Get information about a specific alpha by name or code.
#[must_use]
pub fn get_alpha_info(name: &str) -> Option<AlphaInfo> {
    name.parse::<AlphaKind>().ok().map(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_alphas() {
        let alphas = available_alphas();
        assert_eq!(alphas.len(), AlphaKind::COUNT);
        let codes: Vec<_> = alphas.iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["MR", "Mom", "VB", "XSR", "Val"]);
    }

    #[test]
    fn test_alphas_by_category() {
        let reversion = alphas_by_category(AlphaCategory::Reversion);
        assert_eq!(reversion.len(), 2);
        assert!(reversion.iter().all(|a| a.category == AlphaCategory::Reversion));
    }

    #[test]
    fn test_get_alpha_info() {
        let info = get_alpha_info("Val").unwrap();
        assert_eq!(info.kind, AlphaKind::Value);
        assert_eq!(info.typical_lookback, 252);
        assert!(get_alpha_info("quality").is_none());
    }
}
