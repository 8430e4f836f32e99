//! Kernel engine (C2): holds the training and validation vectors, evaluates
//! `k(i, j)`, materializes cached rows, and keeps a response vector in sync
//! under α updates.

mod gaussian;
mod linear;
mod row_cache;

pub use gaussian::Gaussian;
pub use linear::Linear;
use row_cache::RowCache;

use crate::vector::FeatureVector;

/// A concrete kernel function, selected by name at construction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum KernelKind {
    /// `k(x, y) = ⟨x, y⟩`.
    Linear,
    /// `k(x, y) = exp(γ·(2⟨x, y⟩ − ‖x‖² − ‖y‖²))`, γ > 0.
    Gaussian {
        /// The bandwidth hyperparameter, must be strictly positive.
        gamma: f64,
    },
}

/// Per-vector data a concrete kernel caches alongside the raw feature
/// vectors (e.g. Gaussian's precomputed `‖x‖²`).
trait KernelFn: Send + Sync {
    fn evaluate(&self, vectors: &[FeatureVector], i: usize, j: usize) -> f64;
    fn diagonal(&self, vectors: &[FeatureVector], i: usize) -> f64;
    fn evaluate_external(&self, vectors: &[FeatureVector], x: &FeatureVector, j: usize) -> f64;
}

/// Immutable kernel configuration plus the mutable row cache and response
/// bookkeeping it manages on behalf of an optimizer.
///
/// `vectors` and `labels` hold every example, training and validation alike;
/// indices `[0, training_size)` are training, `[training_size, size)` are
/// validation. Labels are real-valued; their sign determines class.
pub struct KernelEngine {
    kind: KernelKind,
    function: Box<dyn KernelFn>,
    vectors: Vec<FeatureVector>,
    labels: Vec<f64>,
    training_size: usize,
    diagonal: Vec<f64>,
    cache: RowCache,
}

/// Operations a trained optimizer needs from its kernel.
pub trait Kernel {
    /// The total number of examples (training + validation).
    fn size(&self) -> usize;

    /// The number of training examples, `T`.
    fn training_size(&self) -> usize;

    /// The label sequence, length [`Kernel::size`].
    fn labels(&self) -> &[f64];

    /// `k(xᵢ, xⱼ)` for `i, j ∈ [0, size())`.
    fn kernel_inner_product(&self, i: usize, j: usize) -> f64;

    /// The cached column `K[:, i]` for a training index `i`, of length
    /// [`Kernel::size`].
    fn row(&mut self, i: usize) -> std::sync::Arc<[f64]>;

    /// Updates `αᵢ` to `new_alpha` and folds the delta into `r`:
    /// `r ← r + (new_alpha − αᵢ)·K[:, i]`, using a caller-supplied
    /// precomputed row when available.
    fn set_alpha(&mut self, alpha: &mut [f64], r: &mut [f64], i: usize, new_alpha: f64);

    /// As [`Kernel::set_alpha`], but reuses an already-materialized row
    /// instead of fetching one from the cache.
    fn set_alpha_with_row(
        &self,
        alpha: &mut [f64],
        r: &mut [f64],
        i: usize,
        new_alpha: f64,
        row: &[f64],
    );

    /// Recomputes `r` from scratch: `r[j] = Σᵢ αᵢ·K[j, i]` over the training
    /// support.
    fn recalculate_responses(&self, alpha: &[f64], r: &mut [f64]);

    /// `Σⱼ αⱼ·k(x, xⱼ)` for an external vector `x` against the training set.
    fn evaluate(&self, x: &FeatureVector, alpha: &[f64]) -> f64;
}

impl KernelEngine {
    /// Builds a kernel engine over `vectors`/`labels` (both length `size`),
    /// the first `training_size` of which are training examples, with an
    /// LRU row cache of capacity `cache_capacity` (0 disables caching).
    ///
    /// # Panics
    ///
    /// Panics if `vectors.len() != labels.len()` or `training_size >
    /// vectors.len()` — both are configuration-validated by
    /// [`crate::errors::ConfigError`] before construction in the driver;
    /// this constructor trusts its caller.
    #[must_use]
    pub fn new(
        kind: KernelKind,
        vectors: Vec<FeatureVector>,
        labels: Vec<f64>,
        training_size: usize,
        cache_capacity: usize,
    ) -> Self {
        assert_eq!(vectors.len(), labels.len());
        assert!(training_size <= vectors.len());
        let function: Box<dyn KernelFn> = match kind {
            KernelKind::Linear => Box::new(Linear),
            KernelKind::Gaussian { gamma } => Box::new(Gaussian::new(gamma, &vectors)),
        };
        let diagonal = (0..vectors.len()).map(|i| function.diagonal(&vectors, i)).collect();
        Self {
            kind,
            function,
            vectors,
            labels,
            training_size,
            diagonal,
            cache: RowCache::new(cache_capacity),
        }
    }

    /// The kernel variant this engine was constructed with.
    #[must_use]
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    /// The owned feature vectors, training and validation.
    #[must_use]
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

}

impl Kernel for KernelEngine {
    fn size(&self) -> usize {
        self.vectors.len()
    }

    fn training_size(&self) -> usize {
        self.training_size
    }

    fn labels(&self) -> &[f64] {
        &self.labels
    }

    fn kernel_inner_product(&self, i: usize, j: usize) -> f64 {
        if i == j {
            self.diagonal[i]
        } else {
            self.function.evaluate(&self.vectors, i, j)
        }
    }

    fn row(&mut self, i: usize) -> std::sync::Arc<[f64]> {
        let vectors = &self.vectors;
        let function = &self.function;
        self.cache.get_or_insert(i, || {
            use rayon::prelude::*;
            (0..vectors.len()).into_par_iter().map(|j| function.evaluate(vectors, i, j)).collect()
        })
    }

    fn set_alpha(&mut self, alpha: &mut [f64], r: &mut [f64], i: usize, new_alpha: f64) {
        let row = self.row(i);
        self.set_alpha_with_row(alpha, r, i, new_alpha, &row);
    }

    fn set_alpha_with_row(
        &self,
        alpha: &mut [f64],
        r: &mut [f64],
        i: usize,
        new_alpha: f64,
        row: &[f64],
    ) {
        let delta = new_alpha - alpha[i];
        alpha[i] = new_alpha;
        if delta != 0.0 {
            for (rj, &kij) in r.iter_mut().zip(row.iter()) {
                *rj += delta * kij;
            }
        }
    }

    fn recalculate_responses(&self, alpha: &[f64], r: &mut [f64]) {
        use rayon::prelude::*;
        r.par_iter_mut().enumerate().for_each(|(j, rj)| {
            *rj = (0..self.training_size)
                .filter(|&i| alpha[i] != 0.0)
                .map(|i| alpha[i] * self.function.evaluate(&self.vectors, j, i))
                .sum();
        });
    }

    fn evaluate(&self, x: &FeatureVector, alpha: &[f64]) -> f64 {
        (0..self.training_size)
            .filter(|&i| alpha[i] != 0.0)
            .map(|i| alpha[i] * self.function.evaluate_external(&self.vectors, x, i))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::SparseVector;

    fn vectors() -> Vec<FeatureVector> {
        vec![
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 1.0)])),
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 2.0)])),
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, -1.0)])),
        ]
    }

    #[test]
    fn linear_kernel_matches_inner_product() {
        let engine =
            KernelEngine::new(KernelKind::Linear, vectors(), vec![1.0, 1.0, -1.0], 2, 8);
        assert_eq!(engine.kernel_inner_product(0, 1), 2.0);
        assert_eq!(engine.kernel_inner_product(1, 2), -2.0);
        assert_eq!(engine.kernel_inner_product(0, 0), 1.0);
    }

    #[test]
    fn gaussian_kernel_diagonal_is_one() {
        let engine = KernelEngine::new(
            KernelKind::Gaussian { gamma: 0.5 },
            vectors(),
            vec![1.0, 1.0, -1.0],
            2,
            8,
        );
        for i in 0..3 {
            assert!((engine.kernel_inner_product(i, i) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn gaussian_kernel_is_bounded_in_zero_one() {
        let engine = KernelEngine::new(
            KernelKind::Gaussian { gamma: 2.0 },
            vectors(),
            vec![1.0, 1.0, -1.0],
            2,
            8,
        );
        for i in 0..3 {
            for j in 0..3 {
                let k = engine.kernel_inner_product(i, j);
                assert!((0.0..=1.0).contains(&k), "k({i},{j}) = {k} out of bounds");
            }
        }
    }

    #[test]
    fn row_matches_individual_inner_products() {
        let mut engine =
            KernelEngine::new(KernelKind::Linear, vectors(), vec![1.0, 1.0, -1.0], 2, 8);
        let row = engine.row(0);
        for j in 0..3 {
            assert_eq!(row[j], engine.kernel_inner_product(0, j));
        }
    }

    #[test]
    fn set_alpha_updates_response_by_delta_times_row() {
        let mut engine =
            KernelEngine::new(KernelKind::Linear, vectors(), vec![1.0, 1.0, -1.0], 2, 8);
        let mut alpha = vec![0.0, 0.0];
        let mut r = vec![0.0, 0.0, 0.0];
        engine.set_alpha(&mut alpha, &mut r, 0, 1.5);
        assert_eq!(alpha[0], 1.5);
        assert_eq!(r, vec![1.5 * 1.0, 1.5 * 2.0, 1.5 * -1.0]);
    }

    #[test]
    fn recalculate_responses_matches_incremental_updates() {
        let mut engine =
            KernelEngine::new(KernelKind::Linear, vectors(), vec![1.0, 1.0, -1.0], 2, 8);
        let mut alpha = vec![0.0, 0.0];
        let mut r = vec![0.0, 0.0, 0.0];
        engine.set_alpha(&mut alpha, &mut r, 0, 1.0);
        engine.set_alpha(&mut alpha, &mut r, 1, -0.5);
        let mut recomputed = vec![0.0, 0.0, 0.0];
        engine.recalculate_responses(&alpha, &mut recomputed);
        for (a, b) in r.iter().zip(recomputed.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
