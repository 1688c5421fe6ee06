//! Strategy-selected weight storage.

use ndarray::Array2;

use crate::data::TrainingRow;

use super::{ScaledWeightVector, SimpleWeightVector, WeightMatrix};

/// Weight storage chosen at construction time.
///
/// Wraps the closed set of storage strategies so a trainer can pick one from
/// configuration without generics leaking into its signature.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightVector {
    /// Eager storage, scale fixed at 1.
    Simple(SimpleWeightVector),
    /// Lazily scaled storage.
    Scaled(ScaledWeightVector),
}

macro_rules! delegate {
    ($self:expr, $w:ident => $body:expr) => {
        match $self {
            WeightVector::Simple($w) => $body,
            WeightVector::Scaled($w) => $body,
        }
    };
}

impl WeightVector {
    /// Zero-initialized eager storage.
    pub fn simple(n_features: usize, n_classes: usize, fit_intercept: bool) -> Self {
        Self::Simple(SimpleWeightVector::new(n_features, n_classes, fit_intercept))
    }

    /// Zero-initialized lazily scaled storage.
    pub fn scaled(n_features: usize, n_classes: usize, fit_intercept: bool) -> Self {
        Self::Scaled(ScaledWeightVector::new(n_features, n_classes, fit_intercept))
    }

    /// Whether this storage keeps a lazy scale.
    #[inline]
    pub fn is_scaled(&self) -> bool {
        matches!(self, WeightVector::Scaled(_))
    }

    /// The lazily scaled storage, if that is the active strategy.
    pub fn as_scaled(&self) -> Option<&ScaledWeightVector> {
        match self {
            WeightVector::Scaled(w) => Some(w),
            WeightVector::Simple(_) => None,
        }
    }
}

impl WeightMatrix for WeightVector {
    #[inline]
    fn n_features(&self) -> usize {
        delegate!(self, w => w.n_features())
    }

    #[inline]
    fn n_classes(&self) -> usize {
        delegate!(self, w => w.n_classes())
    }

    #[inline]
    fn fit_intercept(&self) -> bool {
        delegate!(self, w => w.fit_intercept())
    }

    #[inline]
    fn scale_factor(&self) -> f64 {
        delegate!(self, w => w.scale_factor())
    }

    #[inline]
    fn is_lazy(&self) -> bool {
        delegate!(self, w => w.is_lazy())
    }

    #[inline]
    fn needs_normalization(&self) -> bool {
        delegate!(self, w => w.needs_normalization())
    }

    #[inline]
    fn coefficient(&self, class: usize, feature: usize) -> f64 {
        delegate!(self, w => w.coefficient(class, feature))
    }

    #[inline]
    fn predict_into<R: TrainingRow + ?Sized>(&self, row: &R, indices: &[usize], out: &mut [f64]) {
        delegate!(self, w => w.predict_into(row, indices, out))
    }

    #[inline]
    fn update<F>(&mut self, f: F, include_intercept: bool)
    where
        F: FnMut(f64, usize, usize) -> f64,
    {
        delegate!(self, w => w.update(f, include_intercept))
    }

    #[inline]
    fn update_row<R, F>(&mut self, row: &R, include_intercept: bool, f: F)
    where
        R: TrainingRow + ?Sized,
        F: FnMut(f64, usize, usize, f64) -> f64,
    {
        delegate!(self, w => w.update_row(row, include_intercept, f))
    }

    #[inline]
    fn scale(&mut self, factor: f64) {
        delegate!(self, w => w.scale(factor))
    }

    #[inline]
    fn normalize(&mut self) {
        delegate!(self, w => w.normalize())
    }

    #[inline]
    fn weight_vector(&self) -> Array2<f64> {
        delegate!(self, w => w.weight_vector())
    }
}
