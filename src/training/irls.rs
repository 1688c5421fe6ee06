//! Newton-Raphson trainer (IRLS).
//!
//! Each iteration solves the Newton system of the weighted objective over all
//! coefficients at once:
//!
//! ```text
//! H · Δ = g        w ← w - Δ
//! ```
//!
//! with `g` from [`MultinomialLoss::total_gradient`] and `H` from
//! [`MultinomialLoss::hessian`]. For the logistic loss this is the same
//! iteration as iteratively reweighted least squares. A step that raises the
//! objective is halved until it doesn't.
//!
//! Time and memory grow with `(F × (K - 1))²`. Use
//! [`SgdTrainer`](super::SgdTrainer) for wide data.
//!
//! # Example
//!
//! ```
//! use logreg_sgd::data::{DenseRow, InMemoryData};
//! use logreg_sgd::training::{IrlsParams, IrlsTrainer};
//!
//! let rows = (0..40)
//!     .map(|i| {
//!         let (x, shift) = (i % 8, i / 8);
//!         let target = if x + shift >= 6 { 1 } else { 0 };
//!         DenseRow::new(i, &[x as f64 - 3.5], target).unwrap()
//!     })
//!     .collect();
//! let data = InMemoryData::new(rows, 2).unwrap();
//!
//! let model = IrlsTrainer::new(IrlsParams::default()).unwrap().train(&data).unwrap();
//! assert!(model.converged());
//! assert!(model.epochs() < 30);
//! ```

use derive_builder::Builder;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::{DataError, TrainingData};
use crate::linear::{SimpleWeightVector, WeightMatrix};

use super::linalg::{active_parameters, solve, submatrix};
use super::logger::{TrainingLogger, Verbosity};
use super::loss::MultinomialLoss;
use super::prior::Prior;
use super::trainer::{relative_change, TrainedModel, TrainingError};

/// Halvings tried before a step is given up on.
const MAX_STEP_HALVINGS: usize = 30;

/// Parameters for Newton (IRLS) training.
///
/// Only the uniform and Gauss priors are supported; the Laplace penalty has
/// no second derivative.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct IrlsParams {
    /// Maximum number of Newton iterations.
    #[builder(default = "30")]
    pub max_iterations: usize,

    /// Convergence threshold on the largest relative coefficient change.
    #[builder(default = "1e-8")]
    pub epsilon: f64,

    /// Prior on the non-intercept coefficients.
    #[builder(default = "Prior::Uniform")]
    pub prior: Prior,

    /// Whether the intercept column is trained.
    #[builder(default = "true")]
    pub fit_intercept: bool,

    #[builder(default)]
    pub verbosity: Verbosity,
}

impl Default for IrlsParams {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            epsilon: 1e-8,
            prior: Prior::Uniform,
            fit_intercept: true,
            verbosity: Verbosity::default(),
        }
    }
}

impl IrlsParams {
    pub fn builder() -> IrlsParamsBuilder {
        IrlsParamsBuilder::default()
    }

    /// Check value ranges and prior support.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.max_iterations == 0 {
            return Err(TrainingError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".into(),
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(TrainingError::InvalidParameter {
                name: "epsilon",
                reason: format!("must be finite and non-negative, got {}", self.epsilon),
            });
        }
        self.prior.validate()?;
        if self.prior.requires_eager() {
            return Err(TrainingError::IncompatiblePrior { strategy: "irls" });
        }
        Ok(())
    }
}

/// Newton-Raphson trainer for multinomial logistic regression.
#[derive(Debug, Clone)]
pub struct IrlsTrainer {
    params: IrlsParams,
}

impl IrlsTrainer {
    /// Validate `params` and create a trainer.
    pub fn new(params: IrlsParams) -> Result<Self, TrainingError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &IrlsParams {
        &self.params
    }

    /// Train on `data`.
    ///
    /// Stops when the largest relative coefficient change drops below
    /// `epsilon`, when no fraction of the Newton step lowers the objective, or
    /// after `max_iterations`.
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

        let active = active_parameters(n_features, n_classes - 1, params.fit_intercept);
        if n_rows < active.len() {
            return Err(TrainingError::TooFewRows {
                rows: n_rows,
                parameters: active.len(),
            });
        }

        let loss = MultinomialLoss;
        let lambda = match params.prior {
            Prior::Gauss { .. } => params.prior.lambda(),
            _ => 0.0,
        };
        let objective_of = |weights: &SimpleWeightVector| {
            loss.total_loss(data, weights) + params.prior.penalty(weights)
        };

        let mut logger = TrainingLogger::new(params.verbosity);
        logger.start_training(params.max_iterations, n_rows, n_features, n_classes);

        let mut weights = SimpleWeightVector::new(n_features, n_classes, params.fit_intercept);
        let mut objective = objective_of(&weights);
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..params.max_iterations {
            iterations = iteration + 1;
            let previous = weights.weight_vector();

            let mut gradient = loss.total_gradient(data, &weights);
            let mut hessian = loss.hessian(data, &weights);
            if lambda > 0.0 {
                add_gauss_terms(&mut gradient, &mut hessian, &previous, lambda);
            }
            let step = newton_step(&gradient, &hessian, &active, previous.dim())
                .ok_or(TrainingError::SingularHessian)?;

            let mut step_size = 1.0;
            let mut candidate = f64::INFINITY;
            for halvings in 0..=MAX_STEP_HALVINGS {
                if halvings > 0 {
                    step_size *= 0.5;
                    logger.log_step_halving(iteration, step_size, candidate);
                }
                move_from(&mut weights, &previous, &step, step_size);
                candidate = objective_of(&weights);
                if candidate.is_finite() && candidate <= objective {
                    break;
                }
            }

            if !(candidate.is_finite() && candidate <= objective) {
                // No fraction of the step helps: the previous weights are the optimum
                // up to rounding.
                weights = SimpleWeightVector::from_array(previous, params.fit_intercept);
                converged = true;
                logger.log_converged(iteration, 0.0, params.epsilon);
                break;
            }

            let max_change = relative_change(&previous, weights.as_array());
            objective = candidate;
            logger.log_iteration(iteration, objective, step_size, max_change);

            if max_change < params.epsilon {
                converged = true;
                logger.log_converged(iteration, max_change, params.epsilon);
                break;
            }
        }

        if !converged {
            logger.warn(&format!(
                "no convergence within {} iterations (epsilon {:e})",
                params.max_iterations, params.epsilon
            ));
        }
        logger.finish_training(iterations, converged);

        Ok(TrainedModel::new(weights, iterations, objective, converged))
    }
}

/// Add the Gauss penalty `λ/2 · Σ w²` over non-intercept cells to the gradient
/// and Hessian.
fn add_gauss_terms(gradient: &mut Array1<f64>, hessian: &mut Array2<f64>, weights: &Array2<f64>, lambda: f64) {
    let (n_outputs, n_features) = weights.dim();
    for class in 0..n_outputs {
        for feature in 1..n_features {
            let index = class * n_features + feature;
            gradient[index] += lambda * weights[[class, feature]];
            hessian[[index, index]] += lambda;
        }
    }
}

/// Solve the Newton system on the active coefficients and lay the result out
/// like the weights. Inactive cells get a zero step.
fn newton_step(
    gradient: &Array1<f64>,
    hessian: &Array2<f64>,
    active: &[usize],
    shape: (usize, usize),
) -> Option<Array2<f64>> {
    let n_features = shape.1;
    let reduced_gradient: Array1<f64> = active.iter().map(|&i| gradient[i]).collect();
    let delta = solve(&submatrix(hessian, active), &reduced_gradient)?;

    let mut step = Array2::zeros(shape);
    for (&index, &d) in active.iter().zip(delta.iter()) {
        step[[index / n_features, index % n_features]] = d;
    }
    Some(step)
}

/// `weights = origin - size · step`.
fn move_from(weights: &mut SimpleWeightVector, origin: &Array2<f64>, step: &Array2<f64>, size: f64) {
    weights.update(|_, class, feature| origin[[class, feature]] - size * step[[class, feature]], true);
}
