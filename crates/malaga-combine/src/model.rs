//! Fitted alpha weights and combined-score inference.

use malaga_traits::stats::{EPSILON, median, quantile};
use malaga_traits::{AlphaKind, AlphaSet, Panel, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Quantile of absolute deviations used as the cross-sectional scale.
pub const SCALE_QUANTILE: f64 = 0.9;

/// One weight per alpha, in [`AlphaKind::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambdaModel {
    lambdas: [f64; AlphaKind::COUNT],
}

impl LambdaModel {
    /// Wraps weights given in [`AlphaKind::ALL`] order.
    #[must_use]
    pub const fn new(lambdas: [f64; AlphaKind::COUNT]) -> Self {
        Self { lambdas }
    }

    /// Weight `1/K` on every alpha.
    #[must_use]
    pub const fn equal() -> Self {
        Self::new([1.0 / AlphaKind::COUNT as f64; AlphaKind::COUNT])
    }

    /// Weight of `kind`.
    #[must_use]
    pub const fn lambda(&self, kind: AlphaKind) -> f64 {
        self.lambdas[kind.index()]
    }

    /// All weights in [`AlphaKind::ALL`] order.
    #[must_use]
    pub const fn lambdas(&self) -> &[f64; AlphaKind::COUNT] {
        &self.lambdas
    }

    /// Weighted sum of the alpha scores, missing alpha cells counting as 0.
    ///
    /// A cell is missing only when every alpha is missing there.
    pub fn raw_combination(&self, alphas: &AlphaSet) -> Array2<f64> {
        let shape = (alphas.n_dates(), alphas.n_symbols());
        let mut sum = Array2::zeros(shape);
        let mut present = Array2::from_elem(shape, false);
        for (kind, panel) in alphas.iter() {
            let lambda = self.lambda(kind);
            ndarray::Zip::from(&mut sum)
                .and(&mut present)
                .and(panel.values())
                .for_each(|s, p, &v| {
                    if !v.is_nan() {
                        *s += lambda * v;
                        *p = true;
                    }
                });
        }
        ndarray::Zip::from(&mut sum)
            .and(&present)
            .for_each(|s, &p| {
                if !p {
                    *s = f64::NAN;
                }
            });
        sum
    }

    /// Combined score panel.
    ///
    /// Per date the weighted sum is centred on its cross-sectional median,
    /// scaled by the 0.9 quantile of absolute deviations plus `1e-6`, and
    /// clipped to `[-1, 1]`.
    pub fn predict(&self, alphas: &AlphaSet) -> Result<Panel> {
        let mut combined = self.raw_combination(alphas);
        for mut row in combined.rows_mut() {
            let present: Vec<f64> = row.iter().copied().filter(|v| !v.is_nan()).collect();
            let Some(center) = median(&present) else {
                continue;
            };
            let deviations: Vec<f64> = present.iter().map(|v| (v - center).abs()).collect();
            let scale = quantile(&deviations, SCALE_QUANTILE).unwrap_or(0.0) + EPSILON;
            row.mapv_inplace(|v| ((v - center) / scale).clamp(-1.0, 1.0));
        }
        alphas.panel_with(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use malaga_traits::{Date, date_range};
    use ndarray::array;

    fn alpha_set(values: [Array2<f64>; AlphaKind::COUNT]) -> AlphaSet {
        let (n_dates, n_symbols) = values[0].dim();
        let dates = date_range(Date::from_ymd_opt(2023, 3, 1).unwrap(), n_dates);
        let symbols: Vec<String> = (0..n_symbols).map(|i| format!("S{i}")).collect();
        let panels = values.map(|v| Panel::new(dates.clone(), symbols.clone(), v).unwrap());
        AlphaSet::new(panels).unwrap()
    }

    #[test]
    fn test_missing_alpha_counts_as_zero() {
        let set = alpha_set([
            array![[1.0, f64::NAN]],
            array![[f64::NAN, f64::NAN]],
            array![[0.5, f64::NAN]],
            array![[f64::NAN, f64::NAN]],
            array![[f64::NAN, f64::NAN]],
        ]);
        let raw = LambdaModel::new([1.0, 2.0, 2.0, 0.0, 0.0]).raw_combination(&set);
        assert_relative_eq!(raw[[0, 0]], 2.0);
        assert!(raw[[0, 1]].is_nan());
    }

    #[test]
    fn test_predict_centres_scales_and_clips() {
        let row = array![[-1.0, 0.0, 0.2, 0.4, 1.0]];
        let zeros = Array2::zeros((1, 5));
        let set = alpha_set([
            zeros.clone(),
            row,
            zeros.clone(),
            zeros.clone(),
            zeros,
        ]);
        let combined = LambdaModel::new([0.0, 1.0, 0.0, 0.0, 0.0])
            .predict(&set)
            .unwrap();
        // median 0.2, |dev| = [1.2, 0.2, 0, 0.2, 0.8], q90 = 1.04
        let scale = 1.04 + EPSILON;
        assert_relative_eq!(combined.get(0, 1).unwrap(), -0.2 / scale, epsilon = 1e-12);
        assert_relative_eq!(combined.get(0, 2).unwrap(), 0.0);
        assert_relative_eq!(combined.get(0, 4).unwrap(), 0.8 / scale, epsilon = 1e-12);
        assert_relative_eq!(combined.get(0, 0).unwrap(), -1.0);
    }

    #[test]
    fn test_predict_keeps_fully_missing_rows() {
        let nan = Array2::from_elem((2, 2), f64::NAN);
        let mut mom = nan.clone();
        mom[[1, 0]] = 0.3;
        mom[[1, 1]] = -0.3;
        let set = alpha_set([nan.clone(), mom, nan.clone(), nan.clone(), nan]);
        let combined = LambdaModel::equal().predict(&set).unwrap();
        assert!(combined.row_is_missing(0));
        assert!(combined.get(1, 0).unwrap() > 0.0);
        assert!(combined.get(1, 1).unwrap() < 0.0);
    }

    #[test]
    fn test_equal_model() {
        let model = LambdaModel::equal();
        assert!(model.lambdas().iter().all(|l| (*l - 0.2).abs() < 1e-15));
        assert_relative_eq!(model.lambda(AlphaKind::Value), 0.2);
    }
}
