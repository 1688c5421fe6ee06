//! Choice of training algorithm.

use serde::{Deserialize, Serialize};

use crate::data::TrainingData;

use super::irls::{IrlsParams, IrlsTrainer};
use super::trainer::{SgdParams, SgdTrainer, TrainedModel, TrainingError};

/// Training algorithm together with its parameters.
///
/// Serialized with a `solver` tag next to the algorithm's own fields:
///
/// ```
/// use logreg_sgd::training::Solver;
///
/// let solver: Solver = serde_json::from_str(r#"{"solver": "irls", "max_iterations": 10}"#).unwrap();
/// match solver {
///     Solver::Irls(params) => assert_eq!(params.max_iterations, 10),
///     Solver::Sgd(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "solver", rename_all = "snake_case")]
pub enum Solver {
    /// Stochastic gradient descent, one row at a time.
    Sgd(SgdParams),
    /// Newton iterations on the full Hessian.
    Irls(IrlsParams),
}

impl Default for Solver {
    fn default() -> Self {
        Solver::Sgd(SgdParams::default())
    }
}

impl Solver {
    pub fn name(&self) -> &'static str {
        match self {
            Solver::Sgd(_) => "sgd",
            Solver::Irls(_) => "irls",
        }
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        match self {
            Solver::Sgd(params) => params.validate(),
            Solver::Irls(params) => params.validate(),
        }
    }

    /// Train with the selected algorithm.
    pub fn train<D: TrainingData>(&self, data: &D) -> Result<TrainedModel, TrainingError> {
        match self {
            Solver::Sgd(params) => SgdTrainer::new(params.clone())?.train(data),
            Solver::Irls(params) => IrlsTrainer::new(params.clone())?.train(data),
        }
    }
}
