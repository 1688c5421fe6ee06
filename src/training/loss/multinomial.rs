//! Multinomial logistic loss with an implicit reference class.

// Allow range loops when we need indices to access multiple arrays.
#![allow(clippy::needless_range_loop)]

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use crate::data::{TrainingData, TrainingRow};
use crate::linear::WeightMatrix;

/// Negative log-likelihood of a softmax over `K` classes where the last class
/// has a fixed score of zero.
///
/// For scores `s` over the `K - 1` non-reference classes and target `t`:
///
/// ```text
/// L      = log(1 + Σ_c exp(s_c)) - s_t          (s_t = 0 when t is the reference)
/// p_c    = exp(s_c) / (1 + Σ_c' exp(s_c'))
/// grad_c = p_c - 1{c == t}
/// ```
///
/// Stateless; copy it wherever a loss is needed.
///
/// # Example
///
/// ```
/// use logreg_sgd::data::DenseRow;
/// use logreg_sgd::training::MultinomialLoss;
///
/// let row = DenseRow::new(0, &[1.0], 0).unwrap();
/// let loss = MultinomialLoss.evaluate(&row, &[3.0]);
/// assert!((loss - 0.0486).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultinomialLoss;

impl MultinomialLoss {
    /// Loss of one row given its `K - 1` scores.
    ///
    /// # Panics
    ///
    /// Panics if the row's target is larger than `prediction.len()`.
    pub fn evaluate<R: TrainingRow + ?Sized>(&self, row: &R, prediction: &[f64]) -> f64 {
        let target = check_target(row, prediction.len());
        let target_score = prediction.get(target).copied().unwrap_or(0.0);
        log_sum_exp(prediction) - target_score
    }

    /// Gradient of the loss with respect to the `K - 1` scores.
    ///
    /// # Panics
    ///
    /// Panics if the row's target is larger than `prediction.len()`.
    pub fn gradient<R: TrainingRow + ?Sized>(&self, row: &R, prediction: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; prediction.len()];
        self.gradient_into(row, prediction, &mut out);
        out
    }

    /// Write the gradient into `out` without allocating.
    pub fn gradient_into<R: TrainingRow + ?Sized>(
        &self,
        row: &R,
        prediction: &[f64],
        out: &mut [f64],
    ) {
        let target = check_target(row, prediction.len());
        self.probabilities_into(prediction, out);
        if target < out.len() {
            out[target] -= 1.0;
        }
    }

    /// Softmax probabilities of the `K - 1` non-reference classes.
    ///
    /// The reference class probability is `1 - Σ p`.
    pub fn probabilities(&self, prediction: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; prediction.len()];
        self.probabilities_into(prediction, &mut out);
        out
    }

    /// Write the non-reference probabilities into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != prediction.len()`.
    pub fn probabilities_into(&self, prediction: &[f64], out: &mut [f64]) {
        assert_eq!(
            out.len(),
            prediction.len(),
            "probability buffer length {} doesn't match prediction length {}",
            out.len(),
            prediction.len()
        );

        // Shift by the largest score, counting the reference score 0.
        let max = max_score(prediction);
        let mut denom = (-max).exp();
        for (p, &s) in out.iter_mut().zip(prediction) {
            *p = (s - max).exp();
            denom += *p;
        }
        let inv = 1.0 / denom;
        for p in out.iter_mut() {
            *p *= inv;
        }
    }

    /// Weighted Hessian of the total loss with respect to every coefficient.
    ///
    /// The result has shape `[F * (K - 1), F * (K - 1)]` and is indexed by
    /// `class * F + feature`, where `F = weights.n_features()`. Each row
    /// contributes
    ///
    /// ```text
    /// w_row * x_f * x_f' * (p_c * δ_cc' - p_c * p_c')
    /// ```
    ///
    /// Only the upper triangle is accumulated; the lower triangle is mirrored so
    /// the result is exactly symmetric. Rows are folded in parallel.
    ///
    /// This is O(rows × (F × (K - 1))²): meant for validation and small problems.
    pub fn hessian<D, M>(&self, data: &D, weights: &M) -> Array2<f64>
    where
        D: TrainingData,
        M: WeightMatrix + Sync,
    {
        let n_features = weights.n_features();
        let n_outputs = weights.n_outputs();
        let dim = n_features * n_outputs;

        let mut hessian = (0..data.n_rows())
            .into_par_iter()
            .fold(
                || Array2::<f64>::zeros((dim, dim)),
                |mut acc, i| {
                    let row = data.row(i);
                    let prediction = weights.predict(row);
                    let probs = self.probabilities(&prediction);
                    let support = row.non_zero_indices();
                    let row_weight = row.weight();

                    for c1 in 0..n_outputs {
                        for c2 in c1..n_outputs {
                            let second = if c1 == c2 {
                                probs[c1] * (1.0 - probs[c1])
                            } else {
                                -probs[c1] * probs[c2]
                            };
                            let scaled = row_weight * second;
                            for &f1 in support {
                                let x1 = row.feature(f1);
                                let r = c1 * n_features + f1;
                                for &f2 in support {
                                    let col = c2 * n_features + f2;
                                    if r <= col {
                                        acc[[r, col]] += scaled * x1 * row.feature(f2);
                                    }
                                }
                            }
                        }
                    }
                    acc
                },
            )
            .reduce(|| Array2::zeros((dim, dim)), |a, b| a + b);

        for r in 0..dim {
            for col in 0..r {
                hessian[[r, col]] = hessian[[col, r]];
            }
        }
        hessian
    }

    /// Weighted gradient of the total loss with respect to every coefficient.
    ///
    /// Indexed like [`hessian`](Self::hessian): `class * F + feature`. Each row
    /// contributes `w_row * (p_c - 1{c == t}) * x_f` over its support.
    pub fn total_gradient<D, M>(&self, data: &D, weights: &M) -> Array1<f64>
    where
        D: TrainingData,
        M: WeightMatrix + Sync,
    {
        let n_features = weights.n_features();
        let n_outputs = weights.n_outputs();
        let dim = n_features * n_outputs;

        (0..data.n_rows())
            .into_par_iter()
            .fold(
                || Array1::<f64>::zeros(dim),
                |mut acc, i| {
                    let row = data.row(i);
                    let prediction = weights.predict(row);
                    let gradient = self.gradient(row, &prediction);
                    let row_weight = row.weight();
                    for (class, &g) in gradient.iter().enumerate() {
                        let scaled = row_weight * g;
                        for &feature in row.non_zero_indices() {
                            acc[class * n_features + feature] += scaled * row.feature(feature);
                        }
                    }
                    acc
                },
            )
            .reduce(|| Array1::zeros(dim), |a, b| a + b)
    }

    /// Weighted sum of row losses under the current weights.
    pub fn total_loss<D, M>(&self, data: &D, weights: &M) -> f64
    where
        D: TrainingData,
        M: WeightMatrix + Sync,
    {
        (0..data.n_rows())
            .into_par_iter()
            .map(|i| {
                let row = data.row(i);
                row.weight() * self.evaluate(row, &weights.predict(row))
            })
            .sum()
    }
}

#[inline]
fn check_target<R: TrainingRow + ?Sized>(row: &R, n_outputs: usize) -> usize {
    let target = row.target();
    assert!(
        target <= n_outputs,
        "row {} has target {} but prediction covers only {} classes",
        row.id(),
        target,
        n_outputs + 1
    );
    target
}

/// Largest score, counting the implicit reference score 0.
#[inline]
fn max_score(prediction: &[f64]) -> f64 {
    prediction.iter().copied().fold(0.0, f64::max)
}

/// `log(1 + Σ exp(s_c))` without overflow.
#[inline]
fn log_sum_exp(prediction: &[f64]) -> f64 {
    let max = max_score(prediction);
    let sum: f64 = (-max).exp() + prediction.iter().map(|&s| (s - max).exp()).sum::<f64>();
    max + sum.ln()
}
