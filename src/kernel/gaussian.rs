//! `k(x, y) = exp(γ·(2⟨x, y⟩ − ‖x‖² − ‖y‖²))`, γ > 0.

use super::KernelFn;
use crate::vector::FeatureVector;

/// The Gaussian (RBF) kernel, with each training/validation vector's `‖x‖²`
/// precomputed once at construction.
#[derive(Debug, Clone)]
pub struct Gaussian {
    gamma: f64,
    norm_squared: Vec<f64>,
}

impl Gaussian {
    /// Precomputes `‖x‖²` for every vector in `vectors`.
    ///
    /// # Panics
    ///
    /// Panics if `gamma` is not strictly positive.
    #[must_use]
    pub fn new(gamma: f64, vectors: &[FeatureVector]) -> Self {
        assert!(gamma > 0.0, "Gaussian kernel requires gamma > 0");
        let norm_squared = vectors.iter().map(FeatureVector::norm_squared).collect();
        Self { gamma, norm_squared }
    }
}

impl KernelFn for Gaussian {
    fn evaluate(&self, vectors: &[FeatureVector], i: usize, j: usize) -> f64 {
        let inner = vectors[i].inner_product(&vectors[j]);
        (self.gamma * (2.0 * inner - self.norm_squared[i] - self.norm_squared[j])).exp()
    }

    fn diagonal(&self, _vectors: &[FeatureVector], _i: usize) -> f64 {
        1.0
    }

    fn evaluate_external(&self, vectors: &[FeatureVector], x: &FeatureVector, j: usize) -> f64 {
        let inner = x.inner_product(&vectors[j]);
        let x_norm_squared = x.norm_squared();
        (self.gamma * (2.0 * inner - x_norm_squared - self.norm_squared[j])).exp()
    }
}
