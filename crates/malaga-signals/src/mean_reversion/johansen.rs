//! Johansen estimate of the leading cointegrating vector.
//!
//! The VECM uses a constant term and one lagged difference. The leading
//! eigenvector of `S_kk⁻¹ S_k0 S_00⁻¹ S_0k` is found through the symmetric
//! form `L⁻¹ S_k0 S_00⁻¹ S_0k L⁻ᵀ` with `S_kk = L Lᵀ`.

use malaga_traits::linalg::{
    backward_substitute, cholesky, forward_substitute, solve_spd_matrix, symmetric_eigen,
};
use malaga_traits::{DegradeReason, Fitted};
use ndarray::{Array1, Array2, ArrayView2, Axis, s};

/// Fewest rows the estimate runs on for `n_assets` instruments.
pub const fn min_rows(n_assets: usize) -> usize {
    2 * n_assets + 3
}

/// Long the first instrument, short the rest equally: `[1, -1/(n-1), ...]`.
pub fn fallback_weights(n_assets: usize) -> Array1<f64> {
    if n_assets <= 1 {
        return Array1::ones(n_assets);
    }
    let mut w = Array1::from_elem(n_assets, -1.0 / (n_assets - 1) as f64);
    w[0] = 1.0;
    w
}

/// Estimates the cointegrating weights of the columns of `log_prices`.
///
/// The vector is scaled so its last element is 1. Too few rows, non-finite
/// input or a singular moment matrix yield [`fallback_weights`] tagged as
/// degraded.
pub fn cointegrating_vector(log_prices: ArrayView2<'_, f64>) -> Fitted<Array1<f64>> {
    let (rows, n) = log_prices.dim();
    if n == 1 {
        return Fitted::Estimated(Array1::ones(1));
    }
    let required = min_rows(n);
    if rows < required {
        return Fitted::degraded(
            fallback_weights(n),
            DegradeReason::InsufficientData {
                required,
                available: rows,
            },
        );
    }
    if log_prices.iter().any(|v| !v.is_finite()) {
        return Fitted::degraded(fallback_weights(n), DegradeReason::NonFiniteInput);
    }
    match leading_eigenvector(log_prices) {
        Some(v) => Fitted::Estimated(normalize_last(v)),
        None => Fitted::degraded(fallback_weights(n), DegradeReason::Singular),
    }
}

fn normalize_last(v: Array1<f64>) -> Array1<f64> {
    let last = v[v.len() - 1];
    if last.abs() > 1e-12 { v / last } else { v }
}

fn demean(x: ArrayView2<'_, f64>) -> Array2<f64> {
    match x.mean_axis(Axis(0)) {
        Some(mean) => &x - &mean,
        None => x.to_owned(),
    }
}

fn residuals(y: &Array2<f64>, z: &Array2<f64>) -> Option<Array2<f64>> {
    let beta = solve_spd_matrix(&z.t().dot(z), &z.t().dot(y))?;
    Some(y - &z.dot(&beta))
}

fn lower_solve(l: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let mut x = Array2::zeros(b.dim());
    for (j, col) in b.columns().into_iter().enumerate() {
        x.column_mut(j)
            .assign(&forward_substitute(l, &col.to_owned()));
    }
    x
}

fn leading_eigenvector(levels: ArrayView2<'_, f64>) -> Option<Array1<f64>> {
    let x = demean(levels);
    let dx = &x.slice(s![1.., ..]) - &x.slice(s![..-1, ..]);

    let lagged_dx = demean(dx.slice(s![..-1, ..]));
    let current_dx = demean(dx.slice(s![1.., ..]));
    let lagged_levels = demean(x.slice(s![1..-1, ..]));

    let r0 = residuals(&current_dx, &lagged_dx)?;
    let rk = residuals(&lagged_levels, &lagged_dx)?;
    let m = r0.nrows() as f64;
    let s00 = r0.t().dot(&r0) / m;
    let s0k = r0.t().dot(&rk) / m;
    let skk = rk.t().dot(&rk) / m;

    // S_k0 S_00⁻¹ S_0k
    let sig = s0k.t().dot(&solve_spd_matrix(&s00, &s0k)?);
    let l = cholesky(&skk)?;
    let half = lower_solve(&l, &sig);
    let sym = lower_solve(&l, &half.t().to_owned());
    let sym = (&sym + &sym.t()) / 2.0;

    let (_, vectors) = symmetric_eigen(&sym)?;
    let v = backward_substitute(&l, &vectors.column(0).to_owned());
    v.iter().all(|x| x.is_finite()).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{noise, random_walk};
    use approx::assert_relative_eq;

    fn cointegrated_pair(n: usize) -> Array2<f64> {
        let base = random_walk(100.0, n, 0.02, 11);
        Array2::from_shape_fn((n, 2), |(t, i)| {
            let lp = base[t].ln();
            if i == 0 { lp } else { lp + 0.01 * noise(t * 17 + 3) }
        })
    }

    #[test]
    fn test_recovers_spread_of_cointegrated_pair() {
        let fitted = cointegrating_vector(cointegrated_pair(500).view());
        assert!(!fitted.is_degraded());
        let w = fitted.into_value();
        assert_relative_eq!(w[1], 1.0);
        assert!((w[0] + 1.0).abs() < 0.1, "weights {w}");
    }

    #[test]
    fn test_fallback_is_long_the_first_instrument() {
        let w = fallback_weights(3);
        assert_eq!(w[0], 1.0);
        assert_relative_eq!(w[1], -0.5);
        assert_relative_eq!(w[2], -0.5);
        assert_eq!(fallback_weights(1).to_vec(), vec![1.0]);
    }

    #[test]
    fn test_short_history_falls_back() {
        let fitted = cointegrating_vector(cointegrated_pair(6).view());
        assert_eq!(
            fitted.reason(),
            Some(&DegradeReason::InsufficientData {
                required: 7,
                available: 6
            })
        );
        assert_eq!(fitted.value().to_vec(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_non_finite_falls_back() {
        let mut levels = cointegrated_pair(50);
        levels[[10, 1]] = f64::NAN;
        let fitted = cointegrating_vector(levels.view());
        assert_eq!(fitted.reason(), Some(&DegradeReason::NonFiniteInput));
    }

    #[test]
    fn test_constant_prices_are_singular() {
        let levels = Array2::from_elem((40, 3), 2.0_f64.ln());
        let fitted = cointegrating_vector(levels.view());
        assert_eq!(fitted.reason(), Some(&DegradeReason::Singular));
        assert_eq!(fitted.value().to_vec(), vec![1.0, -0.5, -0.5]);
    }

    #[test]
    fn test_single_instrument() {
        let levels = Array2::from_elem((3, 1), 1.0);
        let fitted = cointegrating_vector(levels.view());
        assert!(!fitted.is_degraded());
        assert_eq!(fitted.value().to_vec(), vec![1.0]);
    }
}
