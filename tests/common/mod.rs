//! Shared fixtures for integration tests.
//!
//! For assertion helpers, use `logreg_sgd::testing`.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use logreg_sgd::data::{DenseRow, InMemoryData, TrainingData, TrainingRow};

// Re-export testing utilities for convenience
#[allow(unused_imports)]
pub use logreg_sgd::assert_approx_eq;
#[allow(unused_imports)]
pub use logreg_sgd::testing::{
    assert_slice_approx_eq, assert_weights_eq, DEFAULT_TOLERANCE, ORACLE_TOLERANCE,
};

// =============================================================================
// Rows
// =============================================================================

/// Dense row from user features; panics on invalid input.
pub fn dense(id: usize, features: &[f64], target: usize) -> DenseRow {
    DenseRow::new(id, features, target)
        .unwrap_or_else(|e| panic!("invalid fixture row {id}: {e}"))
}

// =============================================================================
// Data sources
// =============================================================================

/// Data source that yields one fixed row.
pub struct SingleRowData<R> {
    row: R,
    target_dimension: usize,
}

impl<R: TrainingRow> SingleRowData<R> {
    pub fn new(row: R, target_dimension: usize) -> Self {
        Self {
            row,
            target_dimension,
        }
    }
}

impl<R: TrainingRow + Sync> TrainingData for SingleRowData<R> {
    type Row = R;

    fn n_rows(&self) -> usize {
        1
    }

    fn feature_count(&self) -> usize {
        self.row.feature_count()
    }

    fn target_dimension(&self) -> usize {
        self.target_dimension
    }

    fn row(&self, index: usize) -> &R {
        assert_eq!(index, 0, "single-row data has no row {index}");
        &self.row
    }
}

/// Gaussian-ish blobs around one center per class.
///
/// Class `c` is centered at `3 * (c + 1)` on feature `c % n_features` and 0
/// elsewhere; noise is uniform in `[-spread, spread]`.
pub fn blobs(
    n_classes: usize,
    n_features: usize,
    per_class: usize,
    spread: f64,
    seed: u64,
) -> InMemoryData<DenseRow> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n_classes * per_class);
    for class in 0..n_classes {
        for _ in 0..per_class {
            let features: Vec<f64> = (0..n_features)
                .map(|f| {
                    let center = if f == class % n_features {
                        3.0 * (class + 1) as f64
                    } else {
                        0.0
                    };
                    center + rng.random_range(-spread..=spread)
                })
                .collect();
            rows.push(dense(rows.len(), &features, class));
        }
    }
    InMemoryData::new(rows, n_classes).unwrap_or_else(|e| panic!("invalid blobs: {e}"))
}

/// Share of rows whose most probable class matches the target.
pub fn accuracy(model: &logreg_sgd::TrainedModel, data: &InMemoryData<DenseRow>) -> f64 {
    let correct = data
        .rows()
        .iter()
        .filter(|row| model.predict_class(*row) == row.target())
        .count();
    correct as f64 / data.n_rows() as f64
}
