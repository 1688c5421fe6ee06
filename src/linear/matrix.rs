//! The weight-matrix capability shared by all storage strategies.

use ndarray::Array2;
use rayon::prelude::*;

use crate::data::{IndexCache, TrainingData, TrainingRow};

/// Mutable coefficient store for a multinomial linear model.
///
/// Shape is `n_outputs × n_features`, where `n_outputs = K - 1` (the reference
/// class has no coefficients) and `n_features` counts feature slots including
/// the intercept slot `0`.
///
/// The intercept column is part of every prediction. `fit_intercept` only
/// decides whether updaters may change it.
///
/// Update closures see and return **logical** coefficients. Implementations that
/// keep a lazy scale convert to and from their raw representation internally.
pub trait WeightMatrix {
    /// Number of feature slots, including the intercept slot.
    fn n_features(&self) -> usize;

    /// Number of classes `K`, including the reference class.
    fn n_classes(&self) -> usize;

    /// Number of non-reference classes, i.e. rows of the matrix.
    #[inline]
    fn n_outputs(&self) -> usize {
        self.n_classes() - 1
    }

    /// Whether the intercept column is trained.
    fn fit_intercept(&self) -> bool;

    /// Current lazy scale. Always `1.0` for eager storage.
    fn scale_factor(&self) -> f64;

    /// Whether [`scale`](Self::scale) takes effect. Eager storage ignores it.
    fn is_lazy(&self) -> bool;

    /// Whether the lazy scale has drifted far enough to warrant
    /// [`normalize`](Self::normalize). Always `false` for eager storage.
    #[inline]
    fn needs_normalization(&self) -> bool {
        false
    }

    /// Logical coefficient at `(class, feature)`.
    fn coefficient(&self, class: usize, feature: usize) -> f64;

    /// Write the `n_outputs` scores of `row`, summed over `indices`, into `out`.
    ///
    /// # Panics
    ///
    /// Panics if the row dimension does not match or `out` has the wrong length.
    fn predict_into<R: TrainingRow + ?Sized>(&self, row: &R, indices: &[usize], out: &mut [f64]);

    /// Scores summed over an explicit index list.
    fn predict_with_indices<R: TrainingRow + ?Sized>(&self, row: &R, indices: &[usize]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_outputs()];
        self.predict_into(row, indices, &mut out);
        out
    }

    /// Scores summed over the row's own non-zero support.
    ///
    /// The support always contains the intercept slot `0`, so the stored
    /// intercept contributes even when `fit_intercept()` is false. Weights
    /// trained without an intercept keep that column at zero; coefficients
    /// loaded through `from_array` are used as given.
    fn predict<R: TrainingRow + ?Sized>(&self, row: &R) -> Vec<f64> {
        self.predict_with_indices(row, row.non_zero_indices())
    }

    /// Scores summed over a precomputed support.
    fn predict_cached<R: TrainingRow + ?Sized>(&self, row: &R, cache: &IndexCache) -> Vec<f64> {
        self.predict_with_indices(row, cache.indices())
    }

    /// Apply `f(value, class, feature) -> new value` to every cell.
    ///
    /// The intercept column is visited only when `include_intercept` is set.
    fn update<F>(&mut self, f: F, include_intercept: bool)
    where
        F: FnMut(f64, usize, usize) -> f64;

    /// Apply `f(value, class, feature, feature_value) -> new value` to the cells
    /// in the row's non-zero support.
    ///
    /// The intercept column is visited only when `include_intercept` is set.
    fn update_row<R, F>(&mut self, row: &R, include_intercept: bool, f: F)
    where
        R: TrainingRow + ?Sized,
        F: FnMut(f64, usize, usize, f64) -> f64;

    /// Multiply all non-intercept coefficients by `factor`.
    ///
    /// Lazy storage does this in O(1); eager storage treats it as a no-op signal
    /// and expects shrinkage to be written through [`update`](Self::update).
    fn scale(&mut self, factor: f64);

    /// Fold the lazy scale into the stored values.
    fn normalize(&mut self);

    /// Dense, descaled copy of the coefficients, shape `[n_outputs, n_features]`.
    fn weight_vector(&self) -> Array2<f64>;

    /// Scores for every row of `data`, shape `[n_rows, n_outputs]`.
    fn predict_batch<D: TrainingData>(&self, data: &D) -> Array2<f64> {
        let n_outputs = self.n_outputs();
        let mut output = Array2::zeros((data.n_rows(), n_outputs));
        for (i, row) in data.iter().enumerate() {
            let mut out_row = output.row_mut(i);
            let out = out_row
                .as_slice_mut()
                .expect("rows of a standard-layout array are contiguous");
            self.predict_into(row, row.non_zero_indices(), out);
        }
        output
    }

    /// Parallel [`predict_batch`](Self::predict_batch) over rows.
    fn par_predict_batch<D: TrainingData>(&self, data: &D) -> Array2<f64>
    where
        Self: Sync,
    {
        let n_outputs = self.n_outputs();
        let flat: Vec<f64> = (0..data.n_rows())
            .into_par_iter()
            .flat_map_iter(|i| self.predict(data.row(i)))
            .collect();
        Array2::from_shape_vec((data.n_rows(), n_outputs), flat)
            .expect("every row yields n_outputs scores")
    }
}

/// Shared precondition for row-wise operations.
#[inline]
pub(crate) fn check_row_dimension<R: TrainingRow + ?Sized>(row: &R, n_features: usize) {
    assert_eq!(
        row.feature_count(),
        n_features,
        "row {} has {} feature slots, weight matrix expects {}",
        row.id(),
        row.feature_count(),
        n_features
    );
}

#[inline]
pub(crate) fn check_output_len(len: usize, n_outputs: usize) {
    assert_eq!(
        len, n_outputs,
        "output buffer length {} doesn't match non-reference class count {}",
        len, n_outputs
    );
}

#[inline]
pub(crate) fn check_dimensions(n_features: usize, n_classes: usize) {
    assert!(
        n_features >= 1,
        "weight matrix needs at least the intercept slot"
    );
    assert!(
        n_classes >= 2,
        "multinomial weights need at least 2 classes, got {}",
        n_classes
    );
}
