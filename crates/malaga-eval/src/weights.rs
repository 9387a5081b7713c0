//! From combined scores to target weights and discrete positions.

use malaga_traits::{MalagaError, Panel, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Weight construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Maximum gross exposure `Σ|w|` per date (default: 1.0).
    pub gross_cap: f64,
    /// Minimum absolute weight for a long or short position (default: 0.2).
    pub threshold: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            gross_cap: 1.0,
            threshold: 0.2,
        }
    }
}

impl WeightConfig {
    /// Checks the cap is positive and the threshold lies in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if !self.gross_cap.is_finite() || self.gross_cap <= 0.0 {
            return Err(MalagaError::InvalidConfig(format!(
                "gross cap must be positive, got {}",
                self.gross_cap
            )));
        }
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(MalagaError::InvalidConfig(format!(
                "threshold must lie in [0, 1), got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionClass {
    /// Short one unit.
    Short,
    /// No position.
    Flat,
    /// Long one unit.
    Long,
}

impl PositionClass {
    /// Classifies a weight against a symmetric threshold. Missing is flat.
    #[must_use]
    pub fn from_weight(weight: f64, threshold: f64) -> Self {
        if weight > threshold {
            Self::Long
        } else if weight < -threshold {
            Self::Short
        } else {
            Self::Flat
        }
    }

    /// `-1`, `0` or `+1`.
    #[must_use]
    pub const fn signum(self) -> f64 {
        match self {
            Self::Short => -1.0,
            Self::Flat => 0.0,
            Self::Long => 1.0,
        }
    }

    /// Whether a position is open.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Flat)
    }
}

fn row_is_missing(row: ArrayView1<'_, f64>) -> bool {
    row.iter().all(|v| v.is_nan())
}

/// Scales each date's combined scores to gross exposure `gross_cap`.
///
/// `w_i = s_i / Σ|s| × cap`, with `Σ|s| = 0` treated as 1. Missing cells in
/// a partially present row get weight 0; a fully missing row stays missing
/// and is held by the simulator.
pub fn continuous_weights(combined: &Panel, gross_cap: f64) -> Result<Panel> {
    let mut weights = Array2::from_elem(combined.values().dim(), f64::NAN);
    for (t, row) in combined.values().rows().into_iter().enumerate() {
        if row_is_missing(row) {
            continue;
        }
        let gross: f64 = row.iter().filter(|v| !v.is_nan()).map(|v| v.abs()).sum();
        let denom = if gross == 0.0 { 1.0 } else { gross };
        for (i, s) in row.iter().enumerate() {
            weights[[t, i]] = if s.is_nan() { 0.0 } else { s / denom * gross_cap };
        }
    }
    combined.with_values(weights)
}

/// Maps weights to `{-1, 0, +1}` with a dead band of `±threshold`.
///
/// Fully missing rows stay missing.
pub fn discrete_positions(weights: &Panel, threshold: f64) -> Result<Panel> {
    let mut positions = Array2::from_elem(weights.values().dim(), f64::NAN);
    for (t, row) in weights.values().rows().into_iter().enumerate() {
        if row_is_missing(row) {
            continue;
        }
        for (i, w) in row.iter().enumerate() {
            positions[[t, i]] = PositionClass::from_weight(*w, threshold).signum();
        }
    }
    weights.with_values(positions)
}

/// `Σ|w|` over present cells.
pub fn gross_exposure(row: ArrayView1<'_, f64>) -> f64 {
    row.iter().filter(|v| !v.is_nan()).map(|v| v.abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use malaga_traits::{Date, date_range};
    use ndarray::array;

    fn panel(values: Array2<f64>) -> Panel {
        let (n_dates, n_symbols) = values.dim();
        let dates = date_range(Date::from_ymd_opt(2024, 5, 1).unwrap(), n_dates);
        let symbols = (0..n_symbols).map(|i| format!("S{i}")).collect();
        Panel::new(dates, symbols, values).unwrap()
    }

    #[test]
    fn test_continuous_weights_respect_cap() {
        let combined = panel(array![[0.5, -0.25, 0.25], [1.0, f64::NAN, -1.0]]);
        let weights = continuous_weights(&combined, 2.0).unwrap();
        assert_relative_eq!(weights.get(0, 0).unwrap(), 1.0);
        assert_relative_eq!(weights.get(0, 1).unwrap(), -0.5);
        assert_relative_eq!(gross_exposure(weights.row(0)), 2.0);
        assert_eq!(weights.get(1, 1), Some(0.0));
        assert_relative_eq!(gross_exposure(weights.row(1)), 2.0);
    }

    #[test]
    fn test_zero_row_and_missing_row() {
        let combined = panel(array![[0.0, 0.0], [f64::NAN, f64::NAN]]);
        let weights = continuous_weights(&combined, 1.0).unwrap();
        assert_eq!(weights.get(0, 0), Some(0.0));
        assert!(weights.row_is_missing(1));
    }

    #[test]
    fn test_discrete_positions_dead_band() {
        let weights = panel(array![[0.3, -0.3, 0.2, -0.1], [f64::NAN; 4]]);
        let positions = discrete_positions(&weights, 0.2).unwrap();
        assert_eq!(positions.row(0).to_vec(), vec![1.0, -1.0, 0.0, 0.0]);
        assert!(positions.row_is_missing(1));
    }

    #[test]
    fn test_validate() {
        assert!(WeightConfig::default().validate().is_ok());
        let bad_cap = WeightConfig {
            gross_cap: 0.0,
            ..WeightConfig::default()
        };
        assert!(bad_cap.validate().is_err());
        let bad_threshold = WeightConfig {
            threshold: 1.0,
            ..WeightConfig::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_position_class() {
        assert_eq!(PositionClass::from_weight(f64::NAN, 0.2), PositionClass::Flat);
        assert_eq!(PositionClass::from_weight(0.21, 0.2), PositionClass::Long);
        assert!(PositionClass::Short.is_active());
        assert!(!PositionClass::Flat.is_active());
    }
}
