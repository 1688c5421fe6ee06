//! Multinomial linear weights.
//!
//! A model over `K` classes keeps one coefficient row per non-reference class.
//! The reference class is the last class, `K - 1`; its score is fixed at zero.
//! Scores are plain dot products over a row's non-zero support:
//!
//! ```text
//! score[c] = Σ_{f ∈ nnz(row)} coefficient[c, f] × feature[f]     c in 0..K-1
//! ```
//!
//! where feature slot `0` is the intercept constant.
//!
//! # Storage Strategies
//!
//! - [`SimpleWeightVector`]: stores logical values directly (eager)
//! - [`ScaledWeightVector`]: stores raw values and a lazy scale (O(1) shrinkage)
//! - [`WeightVector`]: one of the above, selected at construction time
//!
//! All of them implement [`WeightMatrix`].

mod matrix;
mod model;
mod scaled;
mod simple;

pub use matrix::WeightMatrix;
pub use model::WeightVector;
pub use scaled::ScaledWeightVector;
pub use simple::SimpleWeightVector;
