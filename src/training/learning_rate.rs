//! Learning rate schedules.

use serde::{Deserialize, Serialize};

use super::TrainingError;

/// Step size schedule over epochs.
///
/// # Example
///
/// ```
/// use logreg_sgd::training::LearningRateStrategy;
///
/// let annealing = LearningRateStrategy::Annealing { initial: 1.0, decay: 0.5 };
/// assert_eq!(annealing.rate(0, 0), 1.0);
/// assert_eq!(annealing.rate(2, 0), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningRateStrategy {
    /// The same rate for every step.
    Fixed { rate: f64 },
    /// `initial / (1 + decay × epoch)`.
    Annealing { initial: f64, decay: f64 },
}

impl Default for LearningRateStrategy {
    fn default() -> Self {
        LearningRateStrategy::Fixed { rate: 0.01 }
    }
}

impl LearningRateStrategy {
    /// Learning rate for a step within an epoch (both zero-based).
    #[inline]
    pub fn rate(&self, epoch: usize, _step: usize) -> f64 {
        match *self {
            LearningRateStrategy::Fixed { rate } => rate,
            LearningRateStrategy::Annealing { initial, decay } => initial / (1.0 + decay * epoch as f64),
        }
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        match *self {
            LearningRateStrategy::Fixed { rate } => check_rate(rate),
            LearningRateStrategy::Annealing { initial, decay } => {
                check_rate(initial)?;
                if !decay.is_finite() || decay < 0.0 {
                    return Err(TrainingError::InvalidParameter {
                        name: "learning_rate.decay",
                        reason: format!("must be finite and non-negative, got {}", decay),
                    });
                }
                Ok(())
            }
        }
    }
}

fn check_rate(rate: f64) -> Result<(), TrainingError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(TrainingError::InvalidParameter {
            name: "learning_rate",
            reason: format!("must be finite and positive, got {}", rate),
        })
    }
}
