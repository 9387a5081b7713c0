//! Synthetic price panels for unit tests.

use malaga_traits::{Date, PricePanel, date_range};
use ndarray::Array2;

/// Builds a panel with one column per series, symbols `S0, S1, ...`.
pub(crate) fn panel_from_columns(columns: &[Vec<f64>]) -> PricePanel {
    let n_dates = columns[0].len();
    let values = Array2::from_shape_fn((n_dates, columns.len()), |(t, i)| columns[i][t]);
    let symbols = (0..columns.len()).map(|i| format!("S{i}")).collect();
    let dates = date_range(Date::from_ymd_opt(2020, 1, 1).unwrap(), n_dates);
    PricePanel::new(dates, symbols, values).unwrap()
}

/// Deterministic noise in `[-0.5, 0.5)`.
pub(crate) fn noise(seed: usize) -> f64 {
    ((seed as f64 * 12.9898).sin() * 43_758.545_3).fract().abs() - 0.5
}

/// A geometric random walk driven by [`noise`].
pub(crate) fn random_walk(start: f64, n: usize, vol: f64, salt: usize) -> Vec<f64> {
    let mut level = start.ln();
    (0..n)
        .map(|t| {
            if t > 0 {
                level += vol * noise(t * 31 + salt * 7919);
            }
            level.exp()
        })
        .collect()
}
