//! Priors on the coefficients (regularization).
//!
//! A prior adds a penalty over the non-intercept coefficients to the training
//! objective. SGD spreads it evenly over the rows of an epoch:
//!
//! | prior | penalty | per-row step |
//! |---|---|---|
//! | `Uniform` | 0 | none |
//! | `Gauss` (L2) | `λ/2 · Σ w²`, `λ = 1/σ²` | shrink by `1 - lr·λ/n` before the update |
//! | `Laplace` (L1) | `λ · Σ |w|`, `λ = √(2/σ²)` | soft-threshold touched cells by `lr·λ/n` after the update |

use serde::{Deserialize, Serialize};

use crate::data::TrainingRow;
use crate::linear::WeightMatrix;

use super::TrainingError;

/// Prior distribution over the non-intercept coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prior {
    /// No regularization.
    Uniform,
    /// Gaussian prior with the given variance (L2).
    Gauss { variance: f64 },
    /// Laplace prior with the given variance (L1).
    Laplace { variance: f64 },
}

impl Default for Prior {
    fn default() -> Self {
        Prior::Gauss { variance: 1.0 }
    }
}

impl Prior {
    /// Regularization strength.
    pub fn lambda(&self) -> f64 {
        match *self {
            Prior::Uniform => 0.0,
            Prior::Gauss { variance } => 1.0 / variance,
            Prior::Laplace { variance } => (2.0 / variance).sqrt(),
        }
    }

    /// Whether the prior acts on individual cells and so can't go through a lazy scale.
    #[inline]
    pub fn requires_eager(&self) -> bool {
        matches!(self, Prior::Laplace { .. })
    }

    pub fn validate(&self) -> Result<(), TrainingError> {
        match *self {
            Prior::Uniform => Ok(()),
            Prior::Gauss { variance } | Prior::Laplace { variance } => {
                if variance.is_finite() && variance > 0.0 {
                    Ok(())
                } else {
                    Err(TrainingError::InvalidParameter {
                        name: "prior.variance",
                        reason: format!("must be finite and positive, got {}", variance),
                    })
                }
            }
        }
    }

    /// Multiplicative shrink to apply before a row update, if any.
    ///
    /// Clamped at zero so that an oversized step clears the coefficients
    /// instead of flipping their sign.
    pub fn shrink_factor(&self, learning_rate: f64, n_rows: usize) -> Option<f64> {
        match self {
            Prior::Gauss { .. } => {
                Some((1.0 - learning_rate * self.lambda() / n_rows as f64).max(0.0))
            }
            _ => None,
        }
    }

    /// Soft-threshold the non-intercept cells in `row`'s support after an update.
    ///
    /// Only the Laplace prior does anything here.
    pub fn truncate<R, M>(&self, row: &R, weights: &mut M, learning_rate: f64, n_rows: usize)
    where
        R: TrainingRow + ?Sized,
        M: WeightMatrix,
    {
        if let Prior::Laplace { .. } = self {
            let threshold = learning_rate * self.lambda() / n_rows as f64;
            weights.update_row(row, false, |value, _, _, _| soft_threshold(value, threshold));
        }
    }

    /// Penalty term of the objective for the current coefficients.
    pub fn penalty<M: WeightMatrix>(&self, weights: &M) -> f64 {
        let lambda = self.lambda();
        let features = 1..weights.n_features();
        let mut sum = 0.0;
        match self {
            Prior::Uniform => return 0.0,
            Prior::Gauss { .. } => {
                for class in 0..weights.n_outputs() {
                    for feature in features.clone() {
                        let w = weights.coefficient(class, feature);
                        sum += w * w;
                    }
                }
                sum *= 0.5;
            }
            Prior::Laplace { .. } => {
                for class in 0..weights.n_outputs() {
                    for feature in features.clone() {
                        sum += weights.coefficient(class, feature).abs();
                    }
                }
            }
        }
        lambda * sum
    }
}

/// Soft-thresholding operator for L1 regularization.
///
/// S(x, λ) = sign(x) × max(|x| - λ, 0)
#[inline]
fn soft_threshold(x: f64, threshold: f64) -> f64 {
    if x > threshold {
        x - threshold
    } else if x < -threshold {
        x + threshold
    } else {
        0.0
    }
}
