//! Training for multinomial logistic regression.
//!
//! This module provides the pieces of the training loop:
//!
//! - [`MultinomialLoss`]: loss, gradient and Hessian of the multinomial model
//! - [`SgdUpdater`]: one SGD step on a weight matrix ([`EagerSgdUpdater`], [`LazySgdUpdater`])
//! - [`UpdateStrategy`]: picks a matching updater and weight storage
//! - [`Prior`]: Gauss (L2) and Laplace (L1) regularization
//! - [`LearningRateStrategy`]: fixed and annealed step sizes
//! - [`EarlyStopping`]: patience-based stop on the epoch loss
//! - [`TrainingLogger`]: progress reporting gated by [`Verbosity`]
//! - [`SgdTrainer`]: the epoch loop tying it all together
//! - [`IrlsTrainer`]: Newton iterations on the full Hessian, for narrow data
//! - [`Solver`]: picks one of the two trainers from configuration
//! - [`CoefficientStatistics`]: standard errors and Wald tests of a fit

mod callback;
mod irls;
mod learning_rate;
mod linalg;
mod logger;
mod loss;
mod prior;
mod solver;
mod statistics;
mod trainer;
mod updater;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use irls::{IrlsParams, IrlsParamsBuilder, IrlsParamsBuilderError, IrlsTrainer};
pub use learning_rate::LearningRateStrategy;
pub use logger::{TrainingLogger, Verbosity};
pub use loss::MultinomialLoss;
pub use prior::Prior;
pub use solver::Solver;
pub use statistics::CoefficientStatistics;
pub use trainer::{SgdParams, SgdParamsBuilder, SgdParamsBuilderError, SgdTrainer, TrainedModel, TrainingError};
pub use updater::{EagerSgdUpdater, LazySgdUpdater, SgdUpdater, UpdateStrategy, Updater};
