//! Training row abstraction.
//!
//! A [`TrainingRow`] is a read-only view of one labeled example. Feature slot `0`
//! is always the intercept constant `1.0`; user features start at slot `1`.
//!
//! ```text
//! user features:  [x0, x1, x2]
//! row features:   [1.0, x0, x1, x2]
//!                  ^ intercept slot
//! ```
//!
//! Two storage layouts are provided:
//!
//! - [`DenseRow`]: every value stored, O(1) feature lookup
//! - [`SparseRow`]: only non-zero values stored, O(log nnz) feature lookup

use super::DataError;

/// Value of the intercept slot.
pub const INTERCEPT_VALUE: f64 = 1.0;

/// Read-only view of one labeled training example.
pub trait TrainingRow {
    /// Row identifier (position in the originating data source).
    fn id(&self) -> usize;

    /// Target class index in `0..K`.
    fn target(&self) -> usize;

    /// Instance weight.
    fn weight(&self) -> f64 {
        1.0
    }

    /// Number of feature slots, including the intercept slot.
    fn feature_count(&self) -> usize;

    /// Value of feature slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= feature_count()`.
    fn feature(&self, index: usize) -> f64;

    /// Ascending indices of the non-zero feature slots.
    ///
    /// Always starts with the intercept slot `0`.
    fn non_zero_indices(&self) -> &[usize];
}

impl<R: TrainingRow + ?Sized> TrainingRow for &R {
    fn id(&self) -> usize {
        (**self).id()
    }

    fn target(&self) -> usize {
        (**self).target()
    }

    fn weight(&self) -> f64 {
        (**self).weight()
    }

    fn feature_count(&self) -> usize {
        (**self).feature_count()
    }

    fn feature(&self, index: usize) -> f64 {
        (**self).feature(index)
    }

    fn non_zero_indices(&self) -> &[usize] {
        (**self).non_zero_indices()
    }
}

fn check_finite(row: usize, slot: usize, value: f64) -> Result<(), DataError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DataError::NonFiniteFeature { row, slot, value })
    }
}

fn check_weight(row: usize, weight: f64) -> Result<(), DataError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(DataError::InvalidWeight { row, weight })
    }
}

// =============================================================================
// DenseRow
// =============================================================================

/// Training row storing every feature value.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseRow {
    id: usize,
    target: usize,
    weight: f64,
    /// Feature values with the intercept slot prepended.
    values: Box<[f64]>,
    non_zero: Box<[usize]>,
}

impl DenseRow {
    /// Create a dense row from user features (without the intercept slot).
    ///
    /// # Example
    ///
    /// ```
    /// use logreg_sgd::data::{DenseRow, TrainingRow};
    ///
    /// let row = DenseRow::new(0, &[2.0, 0.0, 3.0], 1).unwrap();
    /// assert_eq!(row.feature_count(), 4);
    /// assert_eq!(row.feature(0), 1.0);
    /// assert_eq!(row.non_zero_indices(), &[0, 1, 3]);
    /// ```
    pub fn new(id: usize, features: &[f64], target: usize) -> Result<Self, DataError> {
        Self::with_weight(id, features, target, 1.0)
    }

    /// Create a dense row with an explicit instance weight.
    pub fn with_weight(
        id: usize,
        features: &[f64],
        target: usize,
        weight: f64,
    ) -> Result<Self, DataError> {
        check_weight(id, weight)?;

        let mut values = Vec::with_capacity(features.len() + 1);
        let mut non_zero = Vec::with_capacity(features.len() + 1);
        values.push(INTERCEPT_VALUE);
        non_zero.push(0);

        for (i, &value) in features.iter().enumerate() {
            let slot = i + 1;
            check_finite(id, slot, value)?;
            values.push(value);
            if value != 0.0 {
                non_zero.push(slot);
            }
        }

        Ok(Self {
            id,
            target,
            weight,
            values: values.into_boxed_slice(),
            non_zero: non_zero.into_boxed_slice(),
        })
    }

    /// All feature values, intercept slot first.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl TrainingRow for DenseRow {
    #[inline]
    fn id(&self) -> usize {
        self.id
    }

    #[inline]
    fn target(&self) -> usize {
        self.target
    }

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn feature_count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn feature(&self, index: usize) -> f64 {
        self.values[index]
    }

    #[inline]
    fn non_zero_indices(&self) -> &[usize] {
        &self.non_zero
    }
}

// =============================================================================
// SparseRow
// =============================================================================

/// Training row storing only its non-zero feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    id: usize,
    target: usize,
    weight: f64,
    feature_count: usize,
    /// Slot indices, ascending, intercept first.
    indices: Box<[usize]>,
    values: Box<[f64]>,
}

impl SparseRow {
    /// Create a sparse row from `(feature, value)` pairs.
    ///
    /// `n_features` and the feature indices are in user coordinates (without the
    /// intercept slot). Indices must be strictly ascending. Explicit zeros are
    /// dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use logreg_sgd::data::{SparseRow, TrainingRow};
    ///
    /// let row = SparseRow::new(3, 5, &[(1, 2.5), (4, -1.0)], 0).unwrap();
    /// assert_eq!(row.feature_count(), 6);
    /// assert_eq!(row.non_zero_indices(), &[0, 2, 5]);
    /// assert_eq!(row.feature(2), 2.5);
    /// assert_eq!(row.feature(3), 0.0);
    /// ```
    pub fn new(
        id: usize,
        n_features: usize,
        entries: &[(usize, f64)],
        target: usize,
    ) -> Result<Self, DataError> {
        Self::with_weight(id, n_features, entries, target, 1.0)
    }

    /// Create a sparse row with an explicit instance weight.
    pub fn with_weight(
        id: usize,
        n_features: usize,
        entries: &[(usize, f64)],
        target: usize,
        weight: f64,
    ) -> Result<Self, DataError> {
        check_weight(id, weight)?;

        let mut indices = Vec::with_capacity(entries.len() + 1);
        let mut values = Vec::with_capacity(entries.len() + 1);
        indices.push(0);
        values.push(INTERCEPT_VALUE);

        let mut previous: Option<usize> = None;
        for &(feature, value) in entries {
            if feature >= n_features {
                return Err(DataError::FeatureOutOfRange {
                    row: id,
                    feature,
                    n_features,
                });
            }
            if previous.is_some_and(|p| feature <= p) {
                return Err(DataError::UnsortedIndices { row: id, feature });
            }
            previous = Some(feature);

            let slot = feature + 1;
            check_finite(id, slot, value)?;
            if value != 0.0 {
                indices.push(slot);
                values.push(value);
            }
        }

        Ok(Self {
            id,
            target,
            weight,
            feature_count: n_features + 1,
            indices: indices.into_boxed_slice(),
            values: values.into_boxed_slice(),
        })
    }

    /// Stored `(slot, value)` pairs, intercept first.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

impl TrainingRow for SparseRow {
    #[inline]
    fn id(&self) -> usize {
        self.id
    }

    #[inline]
    fn target(&self) -> usize {
        self.target
    }

    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }

    #[inline]
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn feature(&self, index: usize) -> f64 {
        assert!(
            index < self.feature_count,
            "feature index {} out of bounds for row with {} slots",
            index,
            self.feature_count
        );
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    #[inline]
    fn non_zero_indices(&self) -> &[usize] {
        &self.indices
    }
}
