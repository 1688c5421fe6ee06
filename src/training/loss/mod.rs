//! Loss functions for SGD training.
//!
//! - [`MultinomialLoss`]: softmax cross-entropy with the last class as reference

mod multinomial;

pub use multinomial::MultinomialLoss;
