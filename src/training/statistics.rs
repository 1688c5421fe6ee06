//! Coefficient statistics from the observed information matrix.
//!
//! At a maximum-likelihood estimate the covariance of the coefficients is
//! approximated by the inverse Hessian of the loss:
//!
//! ```text
//! cov = H⁻¹       se = √diag(cov)       z = w / se       p = 2 Φ(-|z|)
//! ```
//!
//! The Hessian is the unpenalized one, whatever prior was used in training.

use ndarray::Array2;
use statrs::function::erf::erfc;

use crate::data::TrainingData;
use crate::linear::WeightMatrix;

use super::linalg::{active_parameters, invert, submatrix};
use super::loss::MultinomialLoss;
use super::TrainingError;

/// Covariance and Wald statistics of fitted coefficients.
///
/// Matrices shaped like the coefficients are `[n_classes - 1, n_features]`.
/// An intercept that was not fitted has a standard error of `0` and its row
/// and column of the covariance matrix are zero.
///
/// # Example
///
/// ```
/// use logreg_sgd::data::{DenseRow, InMemoryData};
/// use logreg_sgd::training::{IrlsParams, IrlsTrainer};
///
/// // Classes overlap for x in 2..=5, so the estimate is finite.
/// let rows = (0..40)
///     .map(|i| {
///         let (x, shift) = (i % 8, i / 8);
///         let target = if x + shift >= 6 { 1 } else { 0 };
///         DenseRow::new(i, &[x as f64 - 3.5], target).unwrap()
///     })
///     .collect();
/// let data = InMemoryData::new(rows, 2).unwrap();
///
/// let model = IrlsTrainer::new(IrlsParams::default()).unwrap().train(&data).unwrap();
/// let stats = model.statistics(&data).unwrap();
/// assert!(stats.standard_errors().iter().all(|&se| se > 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientStatistics {
    coefficients: Array2<f64>,
    covariance: Array2<f64>,
    standard_errors: Array2<f64>,
}

impl CoefficientStatistics {
    /// Statistics of `weights` on `data`.
    ///
    /// # Errors
    ///
    /// [`TrainingError::TooFewRows`] if there are fewer rows than estimated
    /// coefficients, [`TrainingError::SingularHessian`] if the information
    /// matrix can't be inverted.
    ///
    /// # Panics
    ///
    /// Panics if the rows of `data` don't match the weight dimensions.
    pub fn compute<D, M>(data: &D, weights: &M) -> Result<Self, TrainingError>
    where
        D: TrainingData,
        M: WeightMatrix + Sync,
    {
        let n_features = weights.n_features();
        let n_outputs = weights.n_outputs();
        let dim = n_features * n_outputs;

        let active = active_parameters(n_features, n_outputs, weights.fit_intercept());
        if data.n_rows() < active.len() {
            return Err(TrainingError::TooFewRows {
                rows: data.n_rows(),
                parameters: active.len(),
            });
        }

        let hessian = MultinomialLoss.hessian(data, weights);
        let inverse = invert(&submatrix(&hessian, &active)).ok_or(TrainingError::SingularHessian)?;

        let mut covariance = Array2::zeros((dim, dim));
        for (i, &r) in active.iter().enumerate() {
            for (j, &c) in active.iter().enumerate() {
                covariance[[r, c]] = inverse[[i, j]];
            }
        }

        // Rounding can leave tiny negative variances.
        let standard_errors = Array2::from_shape_fn((n_outputs, n_features), |(class, feature)| {
            let index = class * n_features + feature;
            covariance[[index, index]].abs().sqrt()
        });

        Ok(Self {
            coefficients: weights.weight_vector(),
            covariance,
            standard_errors,
        })
    }

    /// The coefficients the statistics were computed for.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Covariance matrix, indexed by `class * n_features + feature`.
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn standard_errors(&self) -> &Array2<f64> {
        &self.standard_errors
    }

    /// Wald statistics `w / se`. `NaN` where the standard error is zero.
    pub fn z_scores(&self) -> Array2<f64> {
        let mut z = self.coefficients.clone();
        z.zip_mut_with(&self.standard_errors, |w, &se| {
            *w = if se > 0.0 { *w / se } else { f64::NAN };
        });
        z
    }

    /// Two-sided p-values of the Wald test, `2 Φ(-|z|)`.
    pub fn p_values(&self) -> Array2<f64> {
        self.z_scores()
            .mapv(|z| erfc(z.abs() / std::f64::consts::SQRT_2))
    }
}
