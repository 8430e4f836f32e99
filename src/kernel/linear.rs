//! `k(x, y) = ⟨x, y⟩`.

use super::KernelFn;
use crate::vector::FeatureVector;

/// The linear kernel: a bare inner product, no hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct Linear;

impl KernelFn for Linear {
    fn evaluate(&self, vectors: &[FeatureVector], i: usize, j: usize) -> f64 {
        vectors[i].inner_product(&vectors[j])
    }

    fn diagonal(&self, vectors: &[FeatureVector], i: usize) -> f64 {
        vectors[i].norm_squared()
    }

    fn evaluate_external(&self, vectors: &[FeatureVector], x: &FeatureVector, j: usize) -> f64 {
        x.inner_product(&vectors[j])
    }
}
