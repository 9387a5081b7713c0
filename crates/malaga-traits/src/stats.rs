//! Statistical helpers shared by the alpha scorers, combiner and evaluator.
//!
//! Slice statistics ignore `NaN` entries. Rolling statistics follow a strict
//! full-window rule: the value at `t` exists only when all `window`
//! observations ending at `t` are finite, otherwise it is `NaN`.

use ndarray::{Array1, ArrayView1};

/// Additive guard used in every ratio whose denominator may vanish.
pub const EPSILON: f64 = 1e-6;

/// Trading days per year.
pub const TRADING_DAYS: f64 = 252.0;

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Mean of the finite values, `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let xs = finite(values);
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Sample standard deviation (ddof = 1) of the finite values.
///
/// `None` with fewer than two finite values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let xs = finite(values);
    let n = xs.len();
    if n < 2 {
        return None;
    }
    let m = xs.iter().sum::<f64>() / n as f64;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// Median of the finite values.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between order statistics.
///
/// `q` is clamped to `[0, 1]`. Non-finite values are skipped.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut xs = finite(values);
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(xs[lo] + (xs[hi] - xs[lo]) * frac)
}

/// Maps a cross-section onto `[-1, 1]` by average percentile rank.
///
/// Present values get `2p - 1` with `p = (rank - 1) / (n - 1)`, ties sharing
/// their mean rank. Missing values and cross-sections with fewer than two
/// present values score 0.
///
/// # Examples
///
/// ```
/// use malaga_traits::stats::rank_to_unit;
/// use ndarray::array;
///
/// let ranked = rank_to_unit(array![3.0, f64::NAN, 1.0, 2.0].view());
/// assert_eq!(ranked.to_vec(), vec![1.0, 0.0, -1.0, 0.0]);
/// ```
pub fn rank_to_unit(values: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut out = Array1::zeros(values.len());
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    let n = present.len();
    if n < 2 {
        return out;
    }
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && present[end].1 == present[start].1 {
            end += 1;
        }
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let pct = (avg_rank - 1.0) / (n - 1) as f64;
        for &(idx, _) in &present[start..end] {
            out[idx] = 2.0 * pct - 1.0;
        }
        start = end;
    }
    out
}

/// Applies `f` to every full, all-finite trailing window.
pub fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; series.len()];
    if window == 0 {
        return out;
    }
    for t in (window - 1)..series.len() {
        let slice = &series[t + 1 - window..=t];
        if slice.iter().all(|v| v.is_finite()) {
            out[t] = f(slice);
        }
    }
    out
}

/// Trailing mean over `window` observations.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (ddof = 1). A one-period window is `NaN`.
pub fn rolling_std(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |w| sample_std(w).unwrap_or(f64::NAN))
}

/// Trailing minimum.
pub fn rolling_min(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Trailing maximum.
pub fn rolling_max(series: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(series, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Rolling z-score `(x - mean) / (std + EPSILON)` over `window`.
pub fn rolling_zscore(series: &[f64], window: usize) -> Vec<f64> {
    let means = rolling_mean(series, window);
    let stds = rolling_std(series, window);
    series
        .iter()
        .zip(means.iter().zip(&stds))
        .map(|(x, (m, s))| (x - m) / (s + EPSILON))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_mean_and_std_skip_nan() {
        let values = [1.0, 2.0, f64::NAN, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&values).unwrap(), 3.0);
        assert_relative_eq!(sample_std(&values).unwrap(), 2.5_f64.sqrt(), epsilon = 1e-12);
        assert!(sample_std(&[1.0]).is_none());
        assert!(mean(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(median(&values).unwrap(), 2.5);
        assert_relative_eq!(quantile(&values, 0.9).unwrap(), 3.7, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
        assert!(median(&[]).is_none());
    }

    #[test]
    fn test_rank_extremes_and_ties() {
        let ranked = rank_to_unit(array![10.0, 30.0, 20.0].view());
        assert_eq!(ranked.to_vec(), vec![-1.0, 1.0, 0.0]);

        let ranked = rank_to_unit(array![0.0, 0.0, 5.0].view());
        assert_relative_eq!(ranked[0], -0.5);
        assert_relative_eq!(ranked[1], -0.5);
        assert_relative_eq!(ranked[2], 1.0);
    }

    #[test]
    fn test_rank_degenerate_cross_sections() {
        let tied = rank_to_unit(array![7.0, 7.0, 7.0, 7.0].view());
        assert!(tied.iter().all(|v| *v == 0.0));

        let single = rank_to_unit(array![f64::NAN, 2.0].view());
        assert!(single.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_rolling_requires_full_window() {
        let series = [1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0, 7.0];
        let means = rolling_mean(&series, 3);
        assert!(means[1].is_nan());
        assert_relative_eq!(means[2], 2.0);
        assert!(means[3].is_nan());
        assert!(means[5].is_nan());
        assert_relative_eq!(means[6], 6.0);

        let mins = rolling_min(&series, 2);
        let maxs = rolling_max(&series, 2);
        assert_relative_eq!(mins[1], 1.0);
        assert_relative_eq!(maxs[1], 2.0);
    }

    #[test]
    fn test_rolling_std_and_zscore() {
        let series = [1.0, 2.0, 3.0, 4.0];
        let stds = rolling_std(&series, 3);
        assert!(stds[1].is_nan());
        assert_relative_eq!(stds[2], 1.0, epsilon = 1e-12);

        let z = rolling_zscore(&series, 3);
        assert_relative_eq!(z[3], 1.0 / (1.0 + EPSILON), epsilon = 1e-12);
        assert!(rolling_std(&series, 1).iter().all(|v| v.is_nan()));
    }
}
