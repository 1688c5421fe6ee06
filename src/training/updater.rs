//! Stochastic gradient updaters.
//!
//! One SGD step moves every coefficient in a row's non-zero support against
//! the gradient of that row's loss:
//!
//! ```text
//! w[c, f] -= learning_rate × gradient[c] × x[f]      f ∈ nnz(row)
//! ```
//!
//! The intercept slot `0` is only touched when the weights fit an intercept.
//!
//! Two variants differ in how they apply uniform shrinkage:
//!
//! - [`EagerSgdUpdater`]: writes every coefficient (O(features × classes))
//! - [`LazySgdUpdater`]: folds shrinkage into the lazy scale (O(1))
//!
//! [`UpdateStrategy`] selects a matching updater and weight storage.

use serde::{Deserialize, Serialize};

use crate::data::TrainingRow;
use crate::linear::{WeightMatrix, WeightVector};

use super::logger::LOG_TARGET;

/// One SGD step and uniform shrinkage over a [`WeightMatrix`].
pub trait SgdUpdater {
    /// Apply the gradient of one row.
    ///
    /// `gradient` holds one entry per non-reference class. `step` is only used
    /// for trace logging.
    ///
    /// # Panics
    ///
    /// Panics if `gradient.len() != weights.n_outputs()` or the row dimension
    /// doesn't match the weights.
    fn update<R, M>(&self, row: &R, gradient: &[f64], weights: &mut M, learning_rate: f64, step: usize)
    where
        R: TrainingRow + ?Sized,
        M: WeightMatrix;

    /// Multiply every non-intercept coefficient by `factor`.
    fn shrink<M: WeightMatrix>(&self, weights: &mut M, factor: f64);
}

#[inline]
fn check_gradient<M: WeightMatrix>(gradient: &[f64], weights: &M) {
    assert_eq!(
        gradient.len(),
        weights.n_outputs(),
        "gradient has {} entries, weights have {} non-reference classes",
        gradient.len(),
        weights.n_outputs()
    );
}

#[inline]
fn apply_step<R, M>(row: &R, gradient: &[f64], weights: &mut M, learning_rate: f64, step: usize)
where
    R: TrainingRow + ?Sized,
    M: WeightMatrix,
{
    check_gradient(gradient, weights);
    log::trace!(
        target: LOG_TARGET,
        "step {}: row {} lr={:.6} gradient={:?}",
        step,
        row.id(),
        learning_rate,
        gradient
    );

    let include_intercept = weights.fit_intercept();
    weights.update_row(row, include_intercept, |value, class, _, x| {
        value - learning_rate * gradient[class] * x
    });
}

// =============================================================================
// Eager
// =============================================================================

/// Updater for storage without a lazy scale.
///
/// Shrinkage is written cell by cell through [`WeightMatrix::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EagerSgdUpdater;

impl SgdUpdater for EagerSgdUpdater {
    fn update<R, M>(&self, row: &R, gradient: &[f64], weights: &mut M, learning_rate: f64, step: usize)
    where
        R: TrainingRow + ?Sized,
        M: WeightMatrix,
    {
        assert!(
            weights.scale_factor() == 1.0,
            "eager updater requires unscaled weights, got scale {}",
            weights.scale_factor()
        );
        apply_step(row, gradient, weights, learning_rate, step);
    }

    fn shrink<M: WeightMatrix>(&self, weights: &mut M, factor: f64) {
        weights.update(|value, _, _| value * factor, false);
    }
}

// =============================================================================
// Lazy
// =============================================================================

/// Updater that shrinks through the lazy scale.
///
/// Produces the same logical weights as [`EagerSgdUpdater`] up to rounding.
/// The scale is folded back into the stored values once its magnitude drops
/// below [`MIN_SCALE`](crate::linear::ScaledWeightVector::MIN_SCALE). On
/// storage without a lazy scale the shrink is written cell by cell, like the
/// eager updater does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LazySgdUpdater;

impl SgdUpdater for LazySgdUpdater {
    fn update<R, M>(&self, row: &R, gradient: &[f64], weights: &mut M, learning_rate: f64, step: usize)
    where
        R: TrainingRow + ?Sized,
        M: WeightMatrix,
    {
        apply_step(row, gradient, weights, learning_rate, step);
    }

    fn shrink<M: WeightMatrix>(&self, weights: &mut M, factor: f64) {
        if !weights.is_lazy() {
            EagerSgdUpdater.shrink(weights, factor);
            return;
        }
        if factor == 0.0 {
            // A zero scale can't be undone; clear the values instead.
            weights.normalize();
            weights.update(|_, _, _| 0.0, false);
            return;
        }

        weights.scale(factor);
        if weights.needs_normalization() {
            log::debug!(
                target: LOG_TARGET,
                "renormalizing weights at scale {:e}",
                weights.scale_factor()
            );
            weights.normalize();
        }
    }
}

// =============================================================================
// Strategy selection
// =============================================================================

/// Runtime-selected updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Updater {
    /// See [`EagerSgdUpdater`].
    Eager(EagerSgdUpdater),
    /// See [`LazySgdUpdater`].
    Lazy(LazySgdUpdater),
}

impl SgdUpdater for Updater {
    #[inline]
    fn update<R, M>(&self, row: &R, gradient: &[f64], weights: &mut M, learning_rate: f64, step: usize)
    where
        R: TrainingRow + ?Sized,
        M: WeightMatrix,
    {
        match self {
            Updater::Eager(u) => u.update(row, gradient, weights, learning_rate, step),
            Updater::Lazy(u) => u.update(row, gradient, weights, learning_rate, step),
        }
    }

    #[inline]
    fn shrink<M: WeightMatrix>(&self, weights: &mut M, factor: f64) {
        match self {
            Updater::Eager(u) => u.shrink(weights, factor),
            Updater::Lazy(u) => u.shrink(weights, factor),
        }
    }
}

/// How weights are stored and updated during training.
///
/// Both strategies produce the same logical weights; the lazy one makes L2
/// shrinkage O(1) per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// Plain storage, every shrink rewrites all coefficients.
    Eager,
    /// Lazily scaled storage.
    #[default]
    Lazy,
}

impl UpdateStrategy {
    /// The updater for this strategy.
    pub fn create_updater(&self) -> Updater {
        match self {
            UpdateStrategy::Eager => Updater::Eager(EagerSgdUpdater),
            UpdateStrategy::Lazy => Updater::Lazy(LazySgdUpdater),
        }
    }

    /// Zero-initialized weights in the storage this strategy expects.
    pub fn create_weights(&self, n_features: usize, n_classes: usize, fit_intercept: bool) -> WeightVector {
        match self {
            UpdateStrategy::Eager => WeightVector::simple(n_features, n_classes, fit_intercept),
            UpdateStrategy::Lazy => WeightVector::scaled(n_features, n_classes, fit_intercept),
        }
    }

    /// Lowercase name, as used in serialized parameters.
    pub fn name(&self) -> &'static str {
        match self {
            UpdateStrategy::Eager => "eager",
            UpdateStrategy::Lazy => "lazy",
        }
    }
}
