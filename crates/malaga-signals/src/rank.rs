//! Row-wise cross-sectional ranking.

use malaga_traits::stats::rank_to_unit;
use ndarray::Array2;

/// Ranks every date's cross-section onto `[-1, 1]`; missing raw values score 0.
pub(crate) fn rank_rows(raw: &Array2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros(raw.dim());
    for (t, row) in raw.rows().into_iter().enumerate() {
        out.row_mut(t).assign(&rank_to_unit(row));
    }
    out
}
