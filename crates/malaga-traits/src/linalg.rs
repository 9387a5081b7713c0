//! Small dense linear algebra kernels.
//!
//! The systems solved here are tiny (one row and column per alpha or per
//! instrument in a universe), so plain Cholesky and cyclic Jacobi rotations
//! on `ndarray` matrices are enough. Every routine reports failure through
//! `None` so estimators can fall back instead of erroring.

use ndarray::{Array1, Array2};

/// Pivots at or below this magnitude are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

const JACOBI_MAX_SWEEPS: usize = 100;

/// Lower-triangular Cholesky factor `L` with `a = L Lᵀ`.
///
/// Returns `None` when `a` is not square, not finite or not positive definite.
pub fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    if a.ncols() != n || a.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if diag <= PIVOT_TOLERANCE * a[[j, j]].abs().max(1.0) {
            return None;
        }
        let d = diag.sqrt();
        l[[j, j]] = d;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = s / d;
        }
    }
    Some(l)
}

/// Solves `L x = b` for lower-triangular `L`.
pub fn forward_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut x = Array1::zeros(n);
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[[i, k]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    x
}

/// Solves `Lᵀ x = b` for lower-triangular `L`.
pub fn backward_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut s = b[i];
        for k in (i + 1)..n {
            s -= l[[k, i]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    x
}

/// Solves `a x = b` for symmetric positive definite `a`.
pub fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let l = cholesky(a)?;
    let y = forward_substitute(&l, b);
    let x = backward_substitute(&l, &y);
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Solves `a X = B` column by column for symmetric positive definite `a`.
pub fn solve_spd_matrix(a: &Array2<f64>, b: &Array2<f64>) -> Option<Array2<f64>> {
    let l = cholesky(a)?;
    let mut x = Array2::zeros(b.dim());
    for (j, col) in b.columns().into_iter().enumerate() {
        let y = forward_substitute(&l, &col.to_owned());
        x.column_mut(j).assign(&backward_substitute(&l, &y));
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Ridge regression without intercept: solves `(XᵀX + αI) β = Xᵀy`.
///
/// Returns `None` when the regularised system is not positive definite.
pub fn ridge(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Option<Array1<f64>> {
    let mut gram = x.t().dot(x);
    for k in 0..gram.nrows() {
        gram[[k, k]] += alpha;
    }
    let rhs = x.t().dot(y);
    solve_spd(&gram, &rhs)
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns eigenvalues in descending order and the matching unit
/// eigenvectors as columns. `None` if the input is not square or not finite.
pub fn symmetric_eigen(a: &Array2<f64>) -> Option<(Array1<f64>, Array2<f64>)> {
    let n = a.nrows();
    if a.ncols() != n || a.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let mut m = a.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| m[[i, j]] * m[[i, j]])
            .sum();
        if off.sqrt() <= 1e-14 * (1.0 + m.iter().map(|x| x * x).sum::<f64>().sqrt()) {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (m[[q, q]] - m[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + theta.mul_add(theta, 1.0).sqrt());
                let c = 1.0 / t.mul_add(t, 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let mkp = m[[k, p]];
                    let mkq = m[[k, q]];
                    m[[k, p]] = c * mkp - s * mkq;
                    m[[k, q]] = s * mkp + c * mkq;
                }
                for k in 0..n {
                    let mpk = m[[p, k]];
                    let mqk = m[[q, k]];
                    m[[p, k]] = c * mpk - s * mqk;
                    m[[q, k]] = s * mpk + c * mqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| m[[j, j]].total_cmp(&m[[i, i]]));
    let values = Array1::from_iter(order.iter().map(|&i| m[[i, i]]));
    let mut vectors = Array2::zeros((n, n));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }
    Some((values, vectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_cholesky_reconstructs() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let l = cholesky(&a).unwrap();
        let back = l.dot(&l.t());
        for (x, y) in back.iter().zip(a.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        assert!(cholesky(&array![[1.0, 2.0], [2.0, 1.0]]).is_none());
        assert!(cholesky(&array![[0.0, 0.0], [0.0, 0.0]]).is_none());
        assert!(cholesky(&array![[1.0, f64::NAN], [f64::NAN, 1.0]]).is_none());
    }

    #[test]
    fn test_solve_spd() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let b = array![1.0, 2.0];
        let x = solve_spd(&a, &b).unwrap();
        let check = a.dot(&x);
        assert_relative_eq!(check[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(check[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ridge_shrinks_toward_zero() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];
        let ols = ridge(&x, &y, 0.0).unwrap();
        assert_relative_eq!(ols[0], 2.0, epsilon = 1e-12);
        let shrunk = ridge(&x, &y, 1.0).unwrap();
        // 28 / (14 + 1)
        assert_relative_eq!(shrunk[0], 28.0 / 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_eigen_sorted_descending() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let (values, vectors) = symmetric_eigen(&a).unwrap();
        assert_relative_eq!(values[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-10);
        let v0 = vectors.column(0);
        assert_relative_eq!(v0[0].abs(), 0.5_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(v0[0], v0[1], epsilon = 1e-10);
        let av = a.dot(&v0);
        assert_relative_eq!(av[0], 3.0 * v0[0], epsilon = 1e-10);
    }

    #[test]
    fn test_symmetric_eigen_diagonal() {
        let a = array![[1.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 3.0]];
        let (values, vectors) = symmetric_eigen(&a).unwrap();
        assert_eq!(values.to_vec(), vec![5.0, 3.0, 1.0]);
        assert_relative_eq!(vectors[[1, 0]].abs(), 1.0);
    }
}
