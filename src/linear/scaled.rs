//! Lazily scaled weight storage.
//!
//! Repeated L2 shrinkage multiplies every coefficient by the same factor. This
//! storage keeps a single scale next to the raw values so that shrinkage costs
//! O(1) instead of O(features × classes):
//!
//! ```text
//! coefficient(c, 0) = raw[c, 0]            (intercept, never scaled)
//! coefficient(c, f) = raw[c, f] * scale    (f > 0)
//! ```

use ndarray::{s, Array2, ArrayView2};

use crate::data::TrainingRow;

use super::matrix::{check_dimensions, check_output_len, check_row_dimension};
use super::WeightMatrix;

/// Weight matrix with a lazy multiplicative scale on non-intercept columns.
///
/// # Numerical Stability
///
/// A scale that shrinks towards zero over many steps makes every write divide by
/// a tiny number. Call [`normalize`](WeightMatrix::normalize) to fold the scale
/// back into the raw values; the lazy updater does this automatically once the
/// scale drops below [`ScaledWeightVector::MIN_SCALE`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledWeightVector {
    /// Raw values: shape `[n_classes - 1, n_features]`, column 0 is the intercept.
    raw: Array2<f64>,
    scale: f64,
    fit_intercept: bool,
}

impl ScaledWeightVector {
    /// Scale magnitude below which callers should renormalize.
    pub const MIN_SCALE: f64 = 1e-9;

    /// Zero-initialized weights for `n_features` slots and `n_classes` classes.
    ///
    /// # Panics
    ///
    /// Panics if `n_features == 0` or `n_classes < 2`.
    pub fn new(n_features: usize, n_classes: usize, fit_intercept: bool) -> Self {
        check_dimensions(n_features, n_classes);
        Self {
            raw: Array2::zeros((n_classes - 1, n_features)),
            scale: 1.0,
            fit_intercept,
        }
    }

    /// Wrap logical coefficients with shape `[n_classes - 1, n_features]`.
    pub fn from_array(weights: Array2<f64>, fit_intercept: bool) -> Self {
        check_dimensions(weights.ncols(), weights.nrows() + 1);
        Self {
            raw: weights,
            scale: 1.0,
            fit_intercept,
        }
    }

    /// Raw stored values, before applying the scale.
    #[inline]
    pub fn raw_weights(&self) -> ArrayView2<'_, f64> {
        self.raw.view()
    }

    #[inline]
    fn to_raw(&self, feature: usize, logical: f64) -> f64 {
        if feature == 0 {
            logical
        } else {
            logical / self.scale
        }
    }

    #[inline]
    fn to_logical(&self, feature: usize, raw: f64) -> f64 {
        if feature == 0 {
            raw
        } else {
            raw * self.scale
        }
    }
}

impl WeightMatrix for ScaledWeightVector {
    #[inline]
    fn n_features(&self) -> usize {
        self.raw.ncols()
    }

    #[inline]
    fn n_classes(&self) -> usize {
        self.raw.nrows() + 1
    }

    #[inline]
    fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    #[inline]
    fn scale_factor(&self) -> f64 {
        self.scale
    }

    #[inline]
    fn is_lazy(&self) -> bool {
        true
    }

    #[inline]
    fn needs_normalization(&self) -> bool {
        self.scale.abs() < Self::MIN_SCALE
    }

    #[inline]
    fn coefficient(&self, class: usize, feature: usize) -> f64 {
        self.to_logical(feature, self.raw[[class, feature]])
    }

    fn predict_into<R: TrainingRow + ?Sized>(&self, row: &R, indices: &[usize], out: &mut [f64]) {
        check_row_dimension(row, self.n_features());
        check_output_len(out.len(), self.n_outputs());

        for (class, score) in out.iter_mut().enumerate() {
            let raw = self.raw.row(class);
            let mut intercept = 0.0;
            let mut sum = 0.0;
            for &feature in indices {
                if feature == 0 {
                    intercept += raw[0] * row.feature(0);
                } else {
                    sum += raw[feature] * row.feature(feature);
                }
            }
            *score = intercept + self.scale * sum;
        }
    }

    fn update<F>(&mut self, mut f: F, include_intercept: bool)
    where
        F: FnMut(f64, usize, usize) -> f64,
    {
        let start = if include_intercept { 0 } else { 1 };
        let scale = self.scale;
        for ((class, feature), value) in self.raw.indexed_iter_mut() {
            if feature < start {
                continue;
            }
            *value = if feature == 0 {
                f(*value, class, feature)
            } else {
                f(*value * scale, class, feature) / scale
            };
        }
    }

    fn update_row<R, F>(&mut self, row: &R, include_intercept: bool, mut f: F)
    where
        R: TrainingRow + ?Sized,
        F: FnMut(f64, usize, usize, f64) -> f64,
    {
        check_row_dimension(row, self.n_features());

        for class in 0..self.raw.nrows() {
            for &feature in row.non_zero_indices() {
                if feature == 0 && !include_intercept {
                    continue;
                }
                let logical = self.to_logical(feature, self.raw[[class, feature]]);
                let updated = f(logical, class, feature, row.feature(feature));
                self.raw[[class, feature]] = self.to_raw(feature, updated);
            }
        }
    }

    fn scale(&mut self, factor: f64) {
        assert!(
            factor.is_finite() && factor != 0.0,
            "scale factor must be finite and non-zero, got {}",
            factor
        );
        self.scale *= factor;
    }

    fn normalize(&mut self) {
        if self.scale == 1.0 {
            return;
        }
        let scale = self.scale;
        self.raw.slice_mut(s![.., 1..]).mapv_inplace(|v| v * scale);
        self.scale = 1.0;
    }

    fn weight_vector(&self) -> Array2<f64> {
        let mut weights = self.raw.clone();
        let scale = self.scale;
        weights.slice_mut(s![.., 1..]).mapv_inplace(|v| v * scale);
        weights
    }
}
