//! logreg-sgd: stochastic-gradient multinomial logistic regression.
//!
//! The kernel trains a linear softmax model over `K` classes with the last
//! class as reference, one row at a time. Small problems can also be solved
//! with Newton iterations (IRLS), which additionally give coefficient
//! standard errors.
//!
//! # Key Types
//!
//! - [`TrainingRow`] / [`InMemoryData`] - Labeled rows with an intercept slot
//! - [`WeightMatrix`] - Coefficient storage, eager or lazily scaled
//! - [`MultinomialLoss`] - Loss, gradient and Hessian
//! - [`SgdUpdater`] / [`UpdateStrategy`] - One SGD step and strategy selection
//! - [`SgdTrainer`] / [`SgdParams`] - The full epoch loop
//! - [`IrlsTrainer`] / [`CoefficientStatistics`] - Newton solver and Wald statistics
//!
//! # Training
//!
//! Use `SgdParams::builder()` to configure, then `SgdTrainer::new(params)?.train(&data)`.
//! See the [`training`] module for details.

// Re-export approx traits for users who want to compare coefficients
pub use approx;

pub mod data;
pub mod linear;
pub mod testing;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Data types
pub use data::{DataError, DenseRow, IndexCache, InMemoryData, SparseRow, TrainingData, TrainingRow};

// Weight storage
pub use linear::{ScaledWeightVector, SimpleWeightVector, WeightMatrix, WeightVector};

// Training
pub use training::{
    CoefficientStatistics, IrlsParams, IrlsTrainer, MultinomialLoss, Prior, SgdParams, SgdTrainer,
    SgdUpdater, Solver, TrainedModel, TrainingError, UpdateStrategy,
};
