//! Cached non-zero index sets.

use super::TrainingRow;

/// Precomputed support of a training row.
///
/// Holding on to an `IndexCache` lets the same row be predicted many times
/// without re-enumerating its non-zero features. Predictions through the cache
/// sum the same terms in the same order as [`TrainingRow::non_zero_indices`],
/// so results are bit-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexCache {
    indices: Vec<usize>,
}

impl IndexCache {
    /// Cache the support of `row`.
    pub fn new<R: TrainingRow + ?Sized>(row: &R) -> Self {
        Self {
            indices: row.non_zero_indices().to_vec(),
        }
    }

    /// Build a cache from an explicit index list.
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Refill the cache from another row, reusing the allocation.
    pub fn refill<R: TrainingRow + ?Sized>(&mut self, row: &R) {
        self.indices.clear();
        self.indices.extend_from_slice(row.non_zero_indices());
    }

    /// Cached indices.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of cached indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
