//! Eager weight storage.

use ndarray::Array2;

use crate::data::TrainingRow;

use super::matrix::{check_dimensions, check_output_len, check_row_dimension};
use super::WeightMatrix;

/// Weight matrix whose stored values are the logical coefficients.
///
/// The scale is fixed at `1.0`: [`scale`](WeightMatrix::scale) is a no-op and
/// regularization must be written cell by cell through
/// [`update`](WeightMatrix::update).
///
/// # Example
///
/// ```
/// use logreg_sgd::data::DenseRow;
/// use logreg_sgd::linear::{SimpleWeightVector, WeightMatrix};
///
/// // 2 user features + intercept slot, 3 classes (2 non-reference)
/// let mut weights = SimpleWeightVector::new(3, 3, true);
/// weights.update(|_, c, f| (c * 3 + f) as f64, true);
///
/// let row = DenseRow::new(0, &[1.0, 2.0], 0).unwrap();
/// assert_eq!(weights.predict(&row), vec![0.0 + 1.0 + 4.0, 3.0 + 4.0 + 10.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleWeightVector {
    /// Coefficients: shape `[n_classes - 1, n_features]`, column 0 is the intercept.
    weights: Array2<f64>,
    fit_intercept: bool,
}

impl SimpleWeightVector {
    /// Zero-initialized weights for `n_features` slots and `n_classes` classes.
    ///
    /// # Panics
    ///
    /// Panics if `n_features == 0` or `n_classes < 2`.
    pub fn new(n_features: usize, n_classes: usize, fit_intercept: bool) -> Self {
        check_dimensions(n_features, n_classes);
        Self {
            weights: Array2::zeros((n_classes - 1, n_features)),
            fit_intercept,
        }
    }

    /// Wrap existing coefficients with shape `[n_classes - 1, n_features]`.
    pub fn from_array(weights: Array2<f64>, fit_intercept: bool) -> Self {
        check_dimensions(weights.ncols(), weights.nrows() + 1);
        Self {
            weights,
            fit_intercept,
        }
    }

    /// Borrow the stored coefficients.
    #[inline]
    pub fn as_array(&self) -> &Array2<f64> {
        &self.weights
    }
}

impl WeightMatrix for SimpleWeightVector {
    #[inline]
    fn n_features(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    fn n_classes(&self) -> usize {
        self.weights.nrows() + 1
    }

    #[inline]
    fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    #[inline]
    fn scale_factor(&self) -> f64 {
        1.0
    }

    #[inline]
    fn is_lazy(&self) -> bool {
        false
    }

    #[inline]
    fn coefficient(&self, class: usize, feature: usize) -> f64 {
        self.weights[[class, feature]]
    }

    fn predict_into<R: TrainingRow + ?Sized>(&self, row: &R, indices: &[usize], out: &mut [f64]) {
        check_row_dimension(row, self.n_features());
        check_output_len(out.len(), self.n_outputs());

        for (class, score) in out.iter_mut().enumerate() {
            let coefficients = self.weights.row(class);
            let mut sum = 0.0;
            for &feature in indices {
                sum += coefficients[feature] * row.feature(feature);
            }
            *score = sum;
        }
    }

    fn update<F>(&mut self, mut f: F, include_intercept: bool)
    where
        F: FnMut(f64, usize, usize) -> f64,
    {
        let start = if include_intercept { 0 } else { 1 };
        for ((class, feature), value) in self.weights.indexed_iter_mut() {
            if feature >= start {
                *value = f(*value, class, feature);
            }
        }
    }

    fn update_row<R, F>(&mut self, row: &R, include_intercept: bool, mut f: F)
    where
        R: TrainingRow + ?Sized,
        F: FnMut(f64, usize, usize, f64) -> f64,
    {
        check_row_dimension(row, self.n_features());

        for class in 0..self.weights.nrows() {
            let mut coefficients = self.weights.row_mut(class);
            for &feature in row.non_zero_indices() {
                if feature == 0 && !include_intercept {
                    continue;
                }
                let value = &mut coefficients[feature];
                *value = f(*value, class, feature, row.feature(feature));
            }
        }
    }

    #[inline]
    fn scale(&mut self, _factor: f64) {}

    #[inline]
    fn normalize(&mut self) {}

    fn weight_vector(&self) -> Array2<f64> {
        self.weights.clone()
    }
}
