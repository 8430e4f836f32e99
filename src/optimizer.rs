//! Optimizers (C4): eight variants, `{SMO, Perceptron, SBP, Sparsifier} ×
//! {unbiased, biased}`, each driving [`crate::kernel::Kernel`] updates.
//!
//! All eight share the same outward shape (training/validation sizes, α,
//! bias, `‖w‖²`, signed validation responses, `evaluate`, `iterate`,
//! `recalculate`, `write_support`) captured by the [`Optimizer`] trait.
//! Derived scalars (bias, `‖w‖²`, κ, ...) are cached behind [`Dirty`], a
//! typed stand-in for the NaN-sentinel "dirty" flag: `None` means dirty,
//! `Some(value)` means fresh. Any successful [`crate::kernel::Kernel::set_alpha`]
//! or projection invalidates the relevant caches; the next accessor
//! recomputes and refreshes them.

pub mod perceptron;
pub mod sbp;
pub mod smo;
pub mod sparsifier;

use crate::kernel::KernelEngine;
use crate::rng::UniformSource;
use crate::vector::FeatureVector;

/// A lazily-recomputed derived scalar. `None` is "dirty"; `Some` is "fresh".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Dirty<T>(Option<T>);

impl<T: Copy> Dirty<T> {
    pub(crate) fn get_or_compute(&mut self, compute: impl FnOnce() -> T) -> T {
        if let Some(value) = self.0 {
            return value;
        }
        let value = compute();
        self.0 = Some(value);
        value
    }

    pub(crate) fn invalidate(&mut self) {
        self.0 = None;
    }
}

/// The common operations every optimizer variant exposes.
pub trait Optimizer {
    /// `T`, the number of training examples.
    fn training_size(&self) -> usize;

    /// `N − T`, the number of validation examples.
    fn validation_size(&self) -> usize;

    /// The current dual weights, length [`Optimizer::training_size`].
    fn alphas(&self) -> &[f64];

    /// The classifier bias; `0.0` for unbiased variants.
    fn bias(&mut self) -> f64;

    /// `‖w‖² = Σⱼ αⱼ·r[j]`.
    fn norm_squared(&mut self) -> f64;

    /// The validation responses, each signed by its example's label.
    fn validation_responses(&self) -> Vec<f64>;

    /// `Σⱼ αⱼ·k(x, xⱼ)` for an external vector, plus bias for biased
    /// variants.
    fn evaluate(&mut self, x: &FeatureVector) -> f64;

    /// Performs one optimization step, advancing the iteration counter and
    /// returning a gap/progress measure (variant-specific; `0.0` signals
    /// convergence to the driver's stopping criterion).
    fn iterate(&mut self, rng: &mut dyn UniformSource) -> f64;

    /// Recomputes `r` from `α` exactly via the kernel, then marks every
    /// derived cache dirty.
    fn recalculate(&mut self);

    /// The support set: `(αᵢ, vector)` pairs for every `i` with `αᵢ ≠ 0`.
    fn write_support(&mut self) -> Vec<(f64, FeatureVector)>;
}

pub(crate) fn support_pairs(kernel: &KernelEngine, alpha: &[f64]) -> Vec<(f64, FeatureVector)> {
    alpha
        .iter()
        .enumerate()
        .filter(|&(_, &a)| a != 0.0)
        .map(|(i, &a)| (a, kernel.vectors()[i].clone()))
        .collect()
}
