//! Margin-tracking (Norma-style) perceptron: §4.4.3.
//!
//! α accumulates ±1 steps on whichever example currently has the worst
//! margin; the reported classifier is `α / √‖w‖²`, so [`Optimizer::alphas`]
//! exposes the raw accumulated steps while [`Optimizer::evaluate`] and
//! [`Optimizer::write_support`] report the normalized weights actually used
//! for classification.

use super::{Dirty, Optimizer};
use crate::kernel::{Kernel, KernelEngine};
use crate::rng::UniformSource;
use crate::vector::FeatureVector;

/// Unbiased perceptron: a single worst-margin example is stepped each
/// iterate.
pub struct PerceptronUnbiased {
    kernel: KernelEngine,
    mu: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
}

impl PerceptronUnbiased {
    /// Builds an unbiased perceptron with margin parameter `mu`.
    #[must_use]
    pub fn new(kernel: KernelEngine, mu: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        Self { kernel, mu, alpha: vec![0.0; t], r: vec![0.0; n], norm_squared: 0.0, iterations: 0 }
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

impl Optimizer for PerceptronUnbiased {
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
        let scale = self.norm_squared.sqrt();
        (self.training_size()..self.kernel.size())
            .map(|i| labels[i].signum() * self.r[i] / scale)
            .collect()
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        let scale = self.norm_squared.sqrt();
        self.kernel.evaluate(x, &self.alpha) / scale
    }

    fn iterate(&mut self, _rng: &mut dyn UniformSource) -> f64 {
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();
        let (mut worst_index, mut worst_margin) = (0, f64::INFINITY);
        for i in 0..t {
            let margin = labels[i] * self.r[i];
            if margin < worst_margin {
                worst_margin = margin;
                worst_index = i;
            }
        }

        let threshold = self.mu * self.norm_squared.sqrt();
        let gap = worst_margin - threshold;
        if gap < 0.0 {
            self.iterations += 1;
            return 0.0;
        }

        let step = labels[worst_index].signum();
        let r_before = self.r[worst_index];
        let kii = self.kernel.kernel_inner_product(worst_index, worst_index);
        let new_alpha = self.alpha[worst_index] + step;
        self.kernel.set_alpha(&mut self.alpha, &mut self.r, worst_index, new_alpha);
        self.norm_squared += 2.0 * step * r_before + step * step * kii;

        self.iterations += 1;
        gap
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        let scale = self.norm_squared.sqrt();
        self.alpha
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a != 0.0)
            .map(|(i, &a)| (a / scale, self.kernel.vectors()[i].clone()))
            .collect()
    }
}

/// Biased perceptron: steps the worst-margin positive example and the
/// worst-margin negative example together, each iterate.
pub struct PerceptronBiased {
    kernel: KernelEngine,
    mu: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
    bias: Dirty<f64>,
}

impl PerceptronBiased {
    /// Builds a biased perceptron with margin parameter `mu`.
    #[must_use]
    pub fn new(kernel: KernelEngine, mu: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        Self {
            kernel,
            mu,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            norm_squared: 0.0,
            iterations: 0,
            bias: Dirty::default(),
        }
    }

    fn worst_margins(&self) -> (usize, f64, usize, f64) {
        let labels = self.kernel.labels();
        let t = self.training_size();
        let (mut plus_index, mut plus_margin) = (usize::MAX, f64::INFINITY);
        let (mut minus_index, mut minus_margin) = (usize::MAX, f64::INFINITY);
        for i in 0..t {
            if labels[i] > 0.0 {
                if self.r[i] < plus_margin {
                    plus_margin = self.r[i];
                    plus_index = i;
                }
            } else if -self.r[i] < minus_margin {
                minus_margin = -self.r[i];
                minus_index = i;
            }
        }
        (plus_index, plus_margin, minus_index, minus_margin)
    }

    /// The current iteration counter.
    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Restores `α` and the iteration counter from a saved archive,
    /// recomputing `r` and every derived cache from scratch.
    pub(crate) fn restore(&mut self, alpha: Vec<f64>, iterations: u64) {
        self.alpha = alpha;
        self.iterations = iterations;
        Optimizer::recalculate(self);
    }
}

impl Optimizer for PerceptronBiased {
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
        let (_, plus, _, minus) = self.worst_margins();
        self.bias.get_or_compute(|| -0.5 * (plus - minus))
    }

    fn norm_squared(&mut self) -> f64 {
        self.norm_squared
    }

    fn validation_responses(&self) -> Vec<f64> {
        let labels = self.kernel.labels();
        let scale = self.norm_squared.sqrt();
        (self.training_size()..self.kernel.size())
            .map(|i| labels[i].signum() * self.r[i] / scale)
            .collect()
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        let scale = self.norm_squared.sqrt();
        let bias = self.bias();
        self.kernel.evaluate(x, &self.alpha) / scale + bias
    }

    fn iterate(&mut self, _rng: &mut dyn UniformSource) -> f64 {
        let (plus_index, plus_margin, minus_index, minus_margin) = self.worst_margins();
        if plus_index == usize::MAX || minus_index == usize::MAX {
            self.iterations += 1;
            return 0.0;
        }

        let threshold = self.mu * self.norm_squared.sqrt();
        let gap = plus_margin + minus_margin - threshold;
        if gap < 0.0 {
            self.iterations += 1;
            return 0.0;
        }

        let r_plus_before = self.r[plus_index];
        let k_plus = self.kernel.kernel_inner_product(plus_index, plus_index);
        let new_alpha_plus = self.alpha[plus_index] + 1.0;
        self.kernel.set_alpha(&mut self.alpha, &mut self.r, plus_index, new_alpha_plus);
        self.norm_squared += 2.0 * r_plus_before + k_plus;

        let r_minus_before = self.r[minus_index];
        let k_minus = self.kernel.kernel_inner_product(minus_index, minus_index);
        let new_alpha_minus = self.alpha[minus_index] - 1.0;
        self.kernel.set_alpha(&mut self.alpha, &mut self.r, minus_index, new_alpha_minus);
        self.norm_squared += -2.0 * r_minus_before + k_minus;

        self.iterations += 1;
        self.bias.invalidate();
        -gap
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
        self.bias.invalidate();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        let scale = self.norm_squared.sqrt();
        self.alpha
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a != 0.0)
            .map(|(i, &a)| (a / scale, self.kernel.vectors()[i].clone()))
            .collect()
    }
}
