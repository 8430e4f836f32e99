//! Sparsifier: §4.4.5, the hard part.
//!
//! Builds a sparse α matching a precomputed teacher prediction `g[i]` per
//! training example to within `ε`, under a norm budget `W²`. Each iterate
//! scans the training set for the example(s) whose current response is
//! furthest from its clamped target, steps it by `η/k(i,i)` scaled to the
//! selected example's own kernel diagonal (the same per-coordinate scaling
//! SMO uses, not a single dataset-wide maximum), and projects back onto
//! `‖w‖² ≤ W²` when the budget is exceeded. A "no candidate clears ε"
//! outcome is a deliberate no-op: it reports a zero gap so the external
//! stopping criterion (`lastGap ≥ tol`) terminates instead of stalling on a
//! missing update.

use super::Optimizer;
use crate::kernel::{Kernel, KernelEngine};
use crate::vector::FeatureVector;

/// Unbiased sparsifier: a single worst-slack index per iterate.
pub struct SparsifierUnbiased {
    kernel: KernelEngine,
    w_squared: f64,
    eta: f64,
    epsilon: f64,
    targets: Vec<f64>,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
}

impl SparsifierUnbiased {
    /// Builds an unbiased sparsifier matching teacher predictions `g` under
    /// norm budget `w_squared`.
    ///
    /// # Panics
    ///
    /// Panics if `g.len() != kernel.training_size()`.
    #[must_use]
    pub fn new(kernel: KernelEngine, g: Vec<f64>, w_squared: f64, eta: f64, epsilon: f64) -> Self {
        assert_eq!(g.len(), kernel.training_size());
        let n = kernel.size();
        let t = kernel.training_size();
        Self {
            kernel,
            w_squared,
            eta,
            epsilon,
            targets: g,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            norm_squared: 0.0,
            iterations: 0,
        }
    }

    /// The current iteration counter.
    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Restores `α` and the iteration counter from a saved archive,
    /// recomputing `r` and the cached `‖w‖²` from scratch.
    pub(crate) fn restore(&mut self, alpha: Vec<f64>, iterations: u64) {
        self.alpha = alpha;
        self.iterations = iterations;
        Optimizer::recalculate(self);
    }
}

impl Optimizer for SparsifierUnbiased {
    fn training_size(&self) -> usize {
        self.alpha.len()
    }

    fn validation_size(&self) -> usize {
        self.kernel.size() - self.training_size()
    }

    fn alphas(&self) -> &[f64] {
        &self.alpha
    }

    fn bias(&mut self) -> f64 {
        0.0
    }

    fn norm_squared(&mut self) -> f64 {
        self.norm_squared
    }

    fn validation_responses(&self) -> Vec<f64> {
        let labels = self.kernel.labels();
        (self.training_size()..self.kernel.size())
            .map(|i| self.r[i] * labels[i].signum())
            .collect()
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        self.kernel.evaluate(x, &self.alpha)
    }

    fn iterate(&mut self, _rng: &mut dyn crate::rng::UniformSource) -> f64 {
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();

        let mut best_index = None;
        let mut best_slack = self.epsilon;
        for i in 0..t {
            let target = (labels[i] * self.targets[i]).min(1.0);
            if target <= 0.0 {
                continue;
            }
            let slack = target - labels[i] * self.r[i];
            if slack > best_slack {
                best_slack = slack;
                best_index = Some(i);
            }
        }

        let Some(index) = best_index else {
            self.iterations += 1;
            return 0.0;
        };

        let eta_eff = self.eta / self.kernel.kernel_inner_product(index, index);
        let new_alpha = self.alpha[index] + labels[index].signum() * eta_eff;
        self.kernel.set_alpha(&mut self.alpha, &mut self.r, index, new_alpha);
        let mut gap = eta_eff;

        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
        if self.norm_squared > self.w_squared {
            let scale = (self.w_squared / self.norm_squared).sqrt();
            gap = self
                .alpha
                .iter()
                .map(|&a| (1.0 - scale) * a.abs())
                .fold(0.0, f64::max);
            for a in &mut self.alpha {
                *a *= scale;
            }
            for x in &mut self.r {
                *x *= scale;
            }
            self.norm_squared = self.w_squared;
        }

        self.iterations += 1;
        gap
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        super::support_pairs(&self.kernel, &self.alpha)
    }
}

/// Biased sparsifier: steps the worst-slack positive and worst-slack
/// negative index together each iterate.
pub struct SparsifierBiased {
    kernel: KernelEngine,
    w_squared: f64,
    eta: f64,
    epsilon: f64,
    targets: Vec<f64>,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
}

impl SparsifierBiased {
    /// Builds a biased sparsifier matching teacher predictions `g` under
    /// norm budget `w_squared`.
    ///
    /// # Panics
    ///
    /// Panics if `g.len() != kernel.training_size()`.
    #[must_use]
    pub fn new(kernel: KernelEngine, g: Vec<f64>, w_squared: f64, eta: f64, epsilon: f64) -> Self {
        assert_eq!(g.len(), kernel.training_size());
        let n = kernel.size();
        let t = kernel.training_size();
        Self {
            kernel,
            w_squared,
            eta,
            epsilon,
            targets: g,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            norm_squared: 0.0,
            iterations: 0,
        }
    }

    fn current_bias(&self) -> f64 {
        let labels = self.kernel.labels();
        let plus_min = (0..self.training_size())
            .filter(|&i| labels[i] > 0.0)
            .map(|i| self.r[i])
            .fold(f64::INFINITY, f64::min);
        let minus_min = (0..self.training_size())
            .filter(|&i| labels[i] <= 0.0)
            .map(|i| -self.r[i])
            .fold(f64::INFINITY, f64::min);
        0.5 * (plus_min - minus_min)
    }

    /// The current iteration counter.
    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Restores `α` and the iteration counter from a saved archive,
    /// recomputing `r` and the cached `‖w‖²` from scratch.
    pub(crate) fn restore(&mut self, alpha: Vec<f64>, iterations: u64) {
        self.alpha = alpha;
        self.iterations = iterations;
        Optimizer::recalculate(self);
    }
}

impl Optimizer for SparsifierBiased {
    fn training_size(&self) -> usize {
        self.alpha.len()
    }

    fn validation_size(&self) -> usize {
        self.kernel.size() - self.training_size()
    }

    fn alphas(&self) -> &[f64] {
        &self.alpha
    }

    fn bias(&mut self) -> f64 {
        self.current_bias()
    }

    fn norm_squared(&mut self) -> f64 {
        self.norm_squared
    }

    fn validation_responses(&self) -> Vec<f64> {
        let labels = self.kernel.labels();
        (self.training_size()..self.kernel.size())
            .map(|i| self.r[i] * labels[i].signum())
            .collect()
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        let bias = self.current_bias();
        self.kernel.evaluate(x, &self.alpha) + bias
    }

    fn iterate(&mut self, _rng: &mut dyn crate::rng::UniformSource) -> f64 {
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();

        let mut plus_index = None;
        let mut plus_slack = self.epsilon;
        let mut minus_index = None;
        let mut minus_slack = self.epsilon;
        for i in 0..t {
            if labels[i] > 0.0 {
                let target = self.targets[i].min(1.0);
                if target <= 0.0 {
                    continue;
                }
                let slack = target - self.r[i];
                if slack > plus_slack {
                    plus_slack = slack;
                    plus_index = Some(i);
                }
            } else {
                let target = (-self.targets[i]).min(1.0);
                if target <= 0.0 {
                    continue;
                }
                let slack = target + self.r[i];
                if slack > minus_slack {
                    minus_slack = slack;
                    minus_index = Some(i);
                }
            }
        }

        if plus_index.is_none() && minus_index.is_none() {
            self.iterations += 1;
            return 0.0;
        }

        let mut gap = 0.0f64;
        if let Some(i) = plus_index {
            let eta_eff = self.eta / self.kernel.kernel_inner_product(i, i);
            let new_alpha = self.alpha[i] + eta_eff;
            self.kernel.set_alpha(&mut self.alpha, &mut self.r, i, new_alpha);
            gap = gap.max(eta_eff);
        }
        if let Some(i) = minus_index {
            let eta_eff = self.eta / self.kernel.kernel_inner_product(i, i);
            let new_alpha = self.alpha[i] - eta_eff;
            self.kernel.set_alpha(&mut self.alpha, &mut self.r, i, new_alpha);
            gap = gap.max(eta_eff);
        }

        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
        if self.norm_squared > self.w_squared {
            let scale = (self.w_squared / self.norm_squared).sqrt();
            gap = self
                .alpha
                .iter()
                .map(|&a| (1.0 - scale) * a.abs())
                .fold(0.0, f64::max);
            for a in &mut self.alpha {
                *a *= scale;
            }
            for x in &mut self.r {
                *x *= scale;
            }
            self.norm_squared = self.w_squared;
        }

        self.iterations += 1;
        gap
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        super::support_pairs(&self.kernel, &self.alpha)
    }
}
