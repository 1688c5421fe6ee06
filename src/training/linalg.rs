//! Dense solves for the Newton step and the covariance matrix.
//!
//! Both go through nalgebra: QR (Householder) first, SVD when the system is
//! rank deficient. Inputs and outputs stay ndarray so callers never see the
//! backend.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Singular values below this (relative to machine epsilon) count as zero.
const SVD_EPS: f64 = f64::EPSILON * 100.0;

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |i, j| a[[i, j]])
}

/// Flat coefficient indices (`class * n_features + feature`) that are
/// estimated. The intercept slot is left out unless it is fitted.
pub(crate) fn active_parameters(n_features: usize, n_outputs: usize, fit_intercept: bool) -> Vec<usize> {
    let first = if fit_intercept { 0 } else { 1 };
    (0..n_outputs)
        .flat_map(|class| (first..n_features).map(move |feature| class * n_features + feature))
        .collect()
}

/// The square block of `a` on `indices`.
pub(crate) fn submatrix(a: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), indices.len()), |(i, j)| a[[indices[i], indices[j]]])
}

/// Solve `a · x = b` for square `a`.
///
/// Returns `None` if neither QR nor SVD produce a finite solution.
pub(crate) fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    debug_assert_eq!(a.nrows(), a.ncols());
    debug_assert_eq!(a.nrows(), b.len());

    let matrix = to_dmatrix(a);
    let rhs = DVector::from_iterator(b.len(), b.iter().copied());

    let solution = match matrix.clone().qr().solve(&rhs) {
        Some(x) if x.iter().all(|v| v.is_finite()) => x,
        _ => matrix.svd(true, true).solve(&rhs, SVD_EPS).ok()?,
    };
    if solution.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Array1::from_iter(solution.iter().copied()))
}

/// Inverse of a square matrix, or its pseudo-inverse when singular.
pub(crate) fn invert(a: &Array2<f64>) -> Option<Array2<f64>> {
    debug_assert_eq!(a.nrows(), a.ncols());
    let n = a.nrows();

    let matrix = to_dmatrix(a);
    let identity = DMatrix::<f64>::identity(n, n);
    let inverse = match matrix.clone().qr().solve(&identity) {
        Some(inv) if inv.iter().all(|v| v.is_finite()) => inv,
        _ => matrix.pseudo_inverse(SVD_EPS).ok()?,
    };
    if inverse.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]))
}
