//! Training data abstractions.
//!
//! The kernel never owns or iterates data on its own; it consumes rows through
//! these interfaces:
//!
//! - [`TrainingRow`]: read-only view of one labeled example
//! - [`IndexCache`]: cached non-zero support of a row for repeated predictions
//! - [`TrainingData`]: row source with dimensionality metadata
//!
//! # Intercept Slot
//!
//! Every row carries the intercept constant `1.0` in feature slot `0`, so a
//! problem with `n` user features has `n + 1` feature slots. Weight matrices
//! are sized in slots, not user features.
//!
//! # Storage Types
//!
//! - [`DenseRow`]: all values stored
//! - [`SparseRow`]: non-zero values only
//! - [`InMemoryData`]: validated owned collection of rows

mod cache;
mod dataset;
mod row;

pub use cache::IndexCache;
pub use dataset::{DataError, InMemoryData, TrainingData};
pub use row::{DenseRow, SparseRow, TrainingRow, INTERCEPT_VALUE};
