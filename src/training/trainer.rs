//! SGD trainer for multinomial logistic regression.
//!
//! # Example
//!
//! ```
//! use logreg_sgd::data::{DenseRow, InMemoryData};
//! use logreg_sgd::training::{LearningRateStrategy, Prior, SgdParams, SgdTrainer, Verbosity};
//!
//! let rows = vec![
//!     DenseRow::new(0, &[0.0, 0.1], 0).unwrap(),
//!     DenseRow::new(1, &[0.2, 0.0], 0).unwrap(),
//!     DenseRow::new(2, &[3.0, 2.9], 1).unwrap(),
//!     DenseRow::new(3, &[2.8, 3.1], 1).unwrap(),
//! ];
//! let data = InMemoryData::new(rows, 2).unwrap();
//!
//! let params = SgdParams::builder()
//!     .max_epochs(200usize)
//!     .learning_rate(LearningRateStrategy::Fixed { rate: 0.5 })
//!     .prior(Prior::Uniform)
//!     .verbosity(Verbosity::Silent)
//!     .build()
//!     .unwrap();
//!
//! let model = SgdTrainer::new(params).unwrap().train(&data).unwrap();
//! let proba = model.predict_proba(&DenseRow::new(9, &[3.0, 3.0], 0).unwrap());
//! assert!(proba[1] > proba[0]);
//! ```

use derive_builder::Builder;
use ndarray::Array2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::data::{DataError, TrainingData, TrainingRow};
use crate::linear::{SimpleWeightVector, WeightMatrix};

use super::callback::{EarlyStopAction, EarlyStopping};
use super::learning_rate::LearningRateStrategy;
use super::logger::{TrainingLogger, Verbosity};
use super::loss::MultinomialLoss;
use super::prior::Prior;
use super::statistics::CoefficientStatistics;
use super::updater::{SgdUpdater, UpdateStrategy};

// ============================================================================
// TrainingError
// ============================================================================

/// Errors raised before or during training.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainingError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("the laplace prior only works with the eager update strategy, not `{strategy}`")]
    IncompatiblePrior { strategy: &'static str },

    #[error("coefficients became non-finite in epoch {epoch}; lower the learning rate")]
    Diverged { epoch: usize },

    #[error("{rows} rows can't identify {parameters} coefficients")]
    TooFewRows { rows: usize, parameters: usize },

    #[error("the Hessian is singular and could not be solved")]
    SingularHessian,

    #[error(transparent)]
    Data(#[from] DataError),
}

// ============================================================================
// SgdParams
// ============================================================================

/// Parameters for SGD training.
///
/// Build with struct update syntax, [`SgdParams::builder()`], or deserialize
/// from any serde format; missing fields take their defaults.
///
/// # Example
///
/// ```
/// use logreg_sgd::training::{Prior, SgdParams, UpdateStrategy};
///
/// let params = SgdParams {
///     strategy: UpdateStrategy::Eager,
///     prior: Prior::Laplace { variance: 0.5 },
///     ..Default::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct SgdParams {
    // ========================================================================
    // Training loop
    // ========================================================================
    /// Maximum number of passes over the data.
    #[builder(default = "100")]
    pub max_epochs: usize,

    /// Convergence threshold on the largest relative coefficient change
    /// between two epochs.
    #[builder(default = "1e-5")]
    pub epsilon: f64,

    /// Step size schedule.
    #[builder(default)]
    pub learning_rate: LearningRateStrategy,

    // ========================================================================
    // Model
    // ========================================================================
    /// Weight storage and update strategy.
    #[builder(default)]
    pub strategy: UpdateStrategy,

    /// Prior on the non-intercept coefficients.
    #[builder(default)]
    pub prior: Prior,

    /// Whether the intercept column is trained.
    #[builder(default = "true")]
    pub fit_intercept: bool,

    // ========================================================================
    // Row order
    // ========================================================================
    /// Visit rows in a fresh random order every epoch.
    #[builder(default = "true")]
    pub shuffle: bool,

    /// Seed for the row shuffle.
    #[builder(default = "42")]
    pub seed: u64,

    // ========================================================================
    // Early stopping and logging
    // ========================================================================
    /// Stop after this many epochs without loss improvement. `0` disables.
    #[builder(default = "0")]
    pub early_stopping_epochs: usize,

    /// Verbosity level for training output.
    #[builder(default)]
    pub verbosity: Verbosity,
}

impl Default for SgdParams {
    fn default() -> Self {
        Self {
            max_epochs: 100,
            epsilon: 1e-5,
            learning_rate: LearningRateStrategy::default(),
            strategy: UpdateStrategy::default(),
            prior: Prior::default(),
            fit_intercept: true,
            shuffle: true,
            seed: 42,
            early_stopping_epochs: 0,
            verbosity: Verbosity::default(),
        }
    }
}

impl SgdParams {
    /// Create a builder for configuring the parameters.
    pub fn builder() -> SgdParamsBuilder {
        SgdParamsBuilder::default()
    }

    /// Check value ranges and option compatibility.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.max_epochs == 0 {
            return Err(TrainingError::InvalidParameter {
                name: "max_epochs",
                reason: "must be at least 1".into(),
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(TrainingError::InvalidParameter {
                name: "epsilon",
                reason: format!("must be finite and non-negative, got {}", self.epsilon),
            });
        }
        self.learning_rate.validate()?;
        self.prior.validate()?;
        if self.prior.requires_eager() && self.strategy != UpdateStrategy::Eager {
            return Err(TrainingError::IncompatiblePrior {
                strategy: self.strategy.name(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// TrainedModel
// ============================================================================

/// Result of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    weights: SimpleWeightVector,
    epochs: usize,
    loss: f64,
    converged: bool,
}

impl TrainedModel {
    pub(crate) fn new(weights: SimpleWeightVector, epochs: usize, loss: f64, converged: bool) -> Self {
        Self {
            weights,
            epochs,
            loss,
            converged,
        }
    }

    /// Final descaled weights.
    pub fn weights(&self) -> &SimpleWeightVector {
        &self.weights
    }

    /// Coefficients, shape `[n_classes - 1, n_features]`.
    pub fn coefficients(&self) -> &Array2<f64> {
        self.weights.as_array()
    }

    pub fn n_classes(&self) -> usize {
        self.weights.n_classes()
    }

    pub fn n_features(&self) -> usize {
        self.weights.n_features()
    }

    /// Number of epochs (SGD) or Newton iterations (IRLS) actually run.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Objective value (weighted loss plus prior penalty) after the last epoch.
    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Whether training stopped because the coefficients settled.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Raw scores of the non-reference classes.
    pub fn predict<R: TrainingRow + ?Sized>(&self, row: &R) -> Vec<f64> {
        self.weights.predict(row)
    }

    /// Probabilities of all classes; the reference class comes last.
    pub fn predict_proba<R: TrainingRow + ?Sized>(&self, row: &R) -> Vec<f64> {
        let mut proba = MultinomialLoss.probabilities(&self.weights.predict(row));
        let reference = 1.0 - proba.iter().sum::<f64>();
        proba.push(reference.max(0.0));
        proba
    }

    /// Standard errors, z-scores and p-values of the coefficients on `data`.
    ///
    /// See [`CoefficientStatistics::compute`].
    pub fn statistics<D: TrainingData>(&self, data: &D) -> Result<CoefficientStatistics, TrainingError> {
        CoefficientStatistics::compute(data, &self.weights)
    }

    /// Most probable class.
    pub fn predict_class<R: TrainingRow + ?Sized>(&self, row: &R) -> usize {
        let scores = self.weights.predict(row);
        let mut best = scores.len();
        let mut best_score = 0.0;
        for (class, &score) in scores.iter().enumerate() {
            if score > best_score {
                best = class;
                best_score = score;
            }
        }
        best
    }
}

// ============================================================================
// SgdTrainer
// ============================================================================

/// Stochastic gradient descent trainer.
///
/// Each epoch visits every row once. Per row:
///
/// 1. shrink the coefficients (Gauss prior)
/// 2. predict and compute the loss gradient, scaled by the row weight
/// 3. apply the update through the strategy's updater
/// 4. soft-threshold the touched coefficients (Laplace prior)
///
/// After each epoch the objective is logged, and training stops once the
/// largest relative coefficient change drops below `epsilon`, early stopping
/// fires, or `max_epochs` is reached.
#[derive(Debug, Clone)]
pub struct SgdTrainer {
    params: SgdParams,
}

impl SgdTrainer {
    /// Validate `params` and create a trainer.
    pub fn new(params: SgdParams) -> Result<Self, TrainingError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SgdParams {
        &self.params
    }

    /// Train on `data`.
    pub fn train<D: TrainingData>(&self, data: &D) -> Result<TrainedModel, TrainingError> {
        let params = &self.params;
        let n_rows = data.n_rows();
        if n_rows == 0 {
            return Err(DataError::Empty.into());
        }
        let n_classes = data.target_dimension();
        if n_classes < 2 {
            return Err(DataError::TooFewClasses {
                target_dimension: n_classes,
            }
            .into());
        }
        let n_features = data.feature_count();

        let loss = MultinomialLoss;
        let updater = params.strategy.create_updater();
        let mut weights = params
            .strategy
            .create_weights(n_features, n_classes, params.fit_intercept);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
        let mut order: Vec<usize> = (0..n_rows).collect();
        let mut prediction = vec![0.0; n_classes - 1];
        let mut gradient = vec![0.0; n_classes - 1];

        let mut early_stopping = EarlyStopping::new(params.early_stopping_epochs);
        let mut logger = TrainingLogger::new(params.verbosity);
        logger.start_training(params.max_epochs, n_rows, n_features, n_classes);

        let mut previous = weights.weight_vector();
        let mut epochs = 0;
        let mut epoch_loss = f64::INFINITY;
        let mut converged = false;
        let mut step = 0;

        for epoch in 0..params.max_epochs {
            if params.shuffle {
                order = data.shuffled_order(&mut rng);
            }

            for (epoch_step, &index) in order.iter().enumerate() {
                let row = data.row(index);
                let learning_rate = params.learning_rate.rate(epoch, epoch_step);

                if let Some(factor) = params.prior.shrink_factor(learning_rate, n_rows) {
                    updater.shrink(&mut weights, factor);
                }

                weights.predict_into(row, row.non_zero_indices(), &mut prediction);
                loss.gradient_into(row, &prediction, &mut gradient);
                let row_weight = row.weight();
                if row_weight != 1.0 {
                    gradient.iter_mut().for_each(|g| *g *= row_weight);
                }
                if logger.enabled(Verbosity::Debug) {
                    logger.log_step(epoch, epoch_step, row.id(), loss.evaluate(row, &prediction));
                }

                updater.update(row, &gradient, &mut weights, learning_rate, step);
                params.prior.truncate(row, &mut weights, learning_rate, n_rows);
                step += 1;
            }
            epochs = epoch + 1;

            let current = weights.weight_vector();
            if current.iter().any(|w| !w.is_finite()) {
                return Err(TrainingError::Diverged { epoch });
            }
            let max_change = relative_change(&previous, &current);
            previous = current;

            epoch_loss = loss.total_loss(data, &weights) + params.prior.penalty(&weights);
            logger.log_epoch(epoch, epoch_loss, params.learning_rate.rate(epoch, 0), max_change);

            if max_change < params.epsilon {
                converged = true;
                logger.log_converged(epoch, max_change, params.epsilon);
                break;
            }

            if early_stopping.update(epoch_loss) == EarlyStopAction::Stop {
                logger.log_early_stopping(
                    epoch,
                    early_stopping.best_epoch(),
                    early_stopping.best_value().unwrap_or(epoch_loss),
                );
                break;
            }
        }

        if !converged && epochs == params.max_epochs {
            logger.warn(&format!(
                "no convergence within {} epochs (epsilon {:e})",
                params.max_epochs, params.epsilon
            ));
        }
        logger.finish_training(epochs, converged);

        Ok(TrainedModel::new(
            SimpleWeightVector::from_array(previous, params.fit_intercept),
            epochs,
            epoch_loss,
            converged,
        ))
    }
}

/// Largest absolute change relative to the largest current coefficient.
pub(crate) fn relative_change(previous: &Array2<f64>, current: &Array2<f64>) -> f64 {
    let max_diff = previous
        .iter()
        .zip(current.iter())
        .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));
    let max_abs = current.iter().fold(0.0f64, |acc, w| acc.max(w.abs()));
    if max_abs == 0.0 {
        max_diff
    } else {
        max_diff / max_abs
    }
}

// ============================================================================
// Tests
// ============================================================================
