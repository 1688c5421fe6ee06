//! Testing utilities for logreg-sgd.
//!
//! Common assertion helpers for unit tests, integration tests and doc tests.
//!
//! ```ignore
//! use logreg_sgd::assert_approx_eq;
//! use logreg_sgd::testing::{assert_slice_approx_eq, assert_weights_eq, DEFAULT_TOLERANCE};
//! ```

use approx::AbsDiffEq;
use ndarray::Array2;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for coefficient comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Tolerance used for values quoted to four decimals.
pub const ORACLE_TOLERANCE: f64 = 1e-3;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are approximately equal.
///
/// Uses absolute difference comparison with the given tolerance.
///
/// # Examples
///
/// ```
/// # use logreg_sgd::assert_approx_eq;
/// assert_approx_eq!(1.0, 1.0001, 0.001);
/// ```
///
/// # Panics
///
/// Panics if the absolute difference exceeds tolerance.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two slices are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= tolerance,
            "{context}[{i}]: {a} ≠ {e} (diff={diff}, tolerance={tolerance})"
        );
    }
}

// =============================================================================
// Weight Matrix Assertions
// =============================================================================

/// Git-style diff of the class rows that differ.
fn diff_weights(actual: &Array2<f64>, expected: &Array2<f64>, epsilon: f64) -> String {
    let mut result = String::new();
    let (rows, cols) = actual.dim();
    result.push_str(&format!("Shape: ({rows}, {cols})\n"));
    result.push_str(&format!("Epsilon: {epsilon:.0e}\n\n"));

    for (class, (act_row, exp_row)) in actual.rows().into_iter().zip(expected.rows()).enumerate() {
        let row_differs = act_row
            .iter()
            .zip(exp_row.iter())
            .any(|(a, e)| !a.abs_diff_eq(e, epsilon));
        if !row_differs {
            continue;
        }

        result.push_str(&format!("[{class:3}] -"));
        for val in exp_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (expected)\n      +");
        for val in act_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (actual)\n      Δ");
        for (a, e) in act_row.iter().zip(exp_row.iter()) {
            if a.abs_diff_eq(e, epsilon) {
                result.push_str(&format!(" {:>12}", "-"));
            } else {
                result.push_str(&format!(" {:>+12.2e}", a - e));
            }
        }
        result.push('\n');
    }
    result
}

/// Assert that two coefficient matrices are approximately equal.
///
/// On failure, shows a diff of the class rows that differ.
///
/// # Panics
///
/// Panics if shapes differ or any value differs by more than `epsilon`.
pub fn assert_weights_eq(actual: &Array2<f64>, expected: &Array2<f64>, epsilon: f64, context: &str) {
    assert_eq!(
        actual.dim(),
        expected.dim(),
        "{context}: shape mismatch - got {:?}, expected {:?}",
        actual.dim(),
        expected.dim()
    );

    let all_close = actual
        .iter()
        .zip(expected.iter())
        .all(|(a, e)| a.abs_diff_eq(e, epsilon));
    if !all_close {
        panic!(
            "{context}: weights differ\n\n{}",
            diff_weights(actual, expected, epsilon)
        );
    }
}
