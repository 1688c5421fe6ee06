//! Training data sources.
//!
//! [`TrainingData`] is the interface the loss Hessian and the trainer consume;
//! [`InMemoryData`] is the validated, owned implementation.

use rand::seq::SliceRandom;
use rand::Rng;

use super::TrainingRow;

/// Row and dataset construction errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("training data must contain at least one row")]
    Empty,

    #[error("multinomial training needs at least 2 classes, got {target_dimension}")]
    TooFewClasses { target_dimension: usize },

    #[error("row {row} has {got} feature slots, expected {expected}")]
    FeatureCountMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("row {row} has target {target}, but only {n_classes} classes exist")]
    TargetOutOfRange {
        row: usize,
        target: usize,
        n_classes: usize,
    },

    #[error("row {row} has invalid instance weight {weight}")]
    InvalidWeight { row: usize, weight: f64 },

    #[error("row {row} has non-finite value {value} in feature slot {slot}")]
    NonFiniteFeature { row: usize, slot: usize, value: f64 },

    #[error("row {row} references feature {feature}, but only {n_features} features exist")]
    FeatureOutOfRange {
        row: usize,
        feature: usize,
        n_features: usize,
    },

    #[error("row {row} sparse indices are not strictly ascending at feature {feature}")]
    UnsortedIndices { row: usize, feature: usize },
}

/// Source of training rows with dimensionality metadata.
pub trait TrainingData: Sync {
    /// Row type yielded by this source.
    type Row: TrainingRow + Sync;

    /// Number of rows.
    fn n_rows(&self) -> usize;

    /// Number of feature slots per row, including the intercept slot.
    fn feature_count(&self) -> usize;

    /// Number of target classes `K` (reference class included).
    fn target_dimension(&self) -> usize;

    /// Row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_rows()`.
    fn row(&self, index: usize) -> &Self::Row;

    /// Iterate over rows in storage order.
    fn iter(&self) -> impl Iterator<Item = &Self::Row> + '_ {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    /// A random permutation of row indices.
    fn shuffled_order<G: Rng + ?Sized>(&self, rng: &mut G) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_rows()).collect();
        order.shuffle(rng);
        order
    }
}

/// Owned, validated collection of training rows.
///
/// # Example
///
/// ```
/// use logreg_sgd::data::{DenseRow, InMemoryData, TrainingData};
///
/// let rows = vec![
///     DenseRow::new(0, &[1.0, 0.0], 0).unwrap(),
///     DenseRow::new(1, &[0.0, 1.0], 1).unwrap(),
/// ];
/// let data = InMemoryData::new(rows, 2).unwrap();
/// assert_eq!(data.n_rows(), 2);
/// assert_eq!(data.feature_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryData<R> {
    rows: Vec<R>,
    feature_count: usize,
    target_dimension: usize,
}

impl<R: TrainingRow> InMemoryData<R> {
    /// Validate and wrap `rows` for a problem with `target_dimension` classes.
    pub fn new(rows: Vec<R>, target_dimension: usize) -> Result<Self, DataError> {
        if target_dimension < 2 {
            return Err(DataError::TooFewClasses { target_dimension });
        }
        let first = rows.first().ok_or(DataError::Empty)?;
        let feature_count = first.feature_count();

        for row in &rows {
            if row.feature_count() != feature_count {
                return Err(DataError::FeatureCountMismatch {
                    row: row.id(),
                    expected: feature_count,
                    got: row.feature_count(),
                });
            }
            if row.target() >= target_dimension {
                return Err(DataError::TargetOutOfRange {
                    row: row.id(),
                    target: row.target(),
                    n_classes: target_dimension,
                });
            }
            let weight = row.weight();
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(DataError::InvalidWeight {
                    row: row.id(),
                    weight,
                });
            }
        }

        Ok(Self {
            rows,
            feature_count,
            target_dimension,
        })
    }

    /// Borrow all rows.
    #[inline]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Sum of instance weights.
    pub fn total_weight(&self) -> f64 {
        self.rows.iter().map(TrainingRow::weight).sum()
    }
}

impl<R: TrainingRow + Sync> TrainingData for InMemoryData<R> {
    type Row = R;

    #[inline]
    fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    #[inline]
    fn target_dimension(&self) -> usize {
        self.target_dimension
    }

    #[inline]
    fn row(&self, index: usize) -> &R {
        &self.rows[index]
    }
}
