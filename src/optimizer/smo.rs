//! Sequential minimal optimization: §4.4.1 (unbiased, single-coordinate)
//! and §4.4.2 (biased, pair update).

use super::{Dirty, Optimizer, support_pairs};
use crate::kernel::{Kernel, KernelEngine};
use crate::rng::UniformSource;
use crate::vector::FeatureVector;

fn box_bounds(label: f64, upper: f64) -> (f64, f64) {
    if label > 0.0 { (0.0, upper) } else { (-upper, 0.0) }
}

/// Unbiased L2-regularized hinge-loss SMO: minimizes
/// `½λ‖w‖² + (1/T)Σᵢ max(0, 1 − yᵢ·wᵀxᵢ)`, box `|αᵢ| ≤ 1/(λT)`,
/// `sign(αᵢ) = yᵢ`, no bias term.
pub struct SmoUnbiased {
    kernel: KernelEngine,
    lambda: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    iterations: u64,
    norm_squared: Dirty<f64>,
    average_loss: Dirty<f64>,
}

impl SmoUnbiased {
    /// Builds an unbiased SMO optimizer with regularization `lambda` over
    /// `kernel`, with `α` and `r` zero-initialized.
    #[must_use]
    pub fn new(kernel: KernelEngine, lambda: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        Self {
            kernel,
            lambda,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            iterations: 0,
            norm_squared: Dirty::default(),
            average_loss: Dirty::default(),
        }
    }

    fn upper(&self) -> f64 {
        1.0 / (self.lambda * self.training_size() as f64)
    }

    fn invalidate(&mut self) {
        self.norm_squared.invalidate();
        self.average_loss.invalidate();
    }

    /// The current average hinge loss `(1/T)Σᵢ max(0, 1 − yᵢ·rᵢ)`.
    pub fn average_loss(&mut self) -> f64 {
        let (alpha, r, kernel) = (&self.alpha, &self.r, &self.kernel);
        self.average_loss.get_or_compute(|| {
            let labels = kernel.labels();
            let t = alpha.len();
            (0..t).map(|i| (1.0 - labels[i] * r[i]).max(0.0)).sum::<f64>() / t as f64
        })
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

impl Optimizer for SmoUnbiased {
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
        let (alpha, r) = (&self.alpha, &self.r);
        self.norm_squared.get_or_compute(|| {
            alpha.iter().zip(r.iter()).map(|(a, r)| a * r).sum()
        })
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

    fn iterate(&mut self, _rng: &mut dyn UniformSource) -> f64 {
        let upper = self.upper();
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();

        let mut best_gain = f64::NEG_INFINITY;
        let mut best_index = 0;
        let mut best_alpha = self.alpha[0];

        for i in 0..t {
            let kii = self.kernel.kernel_inner_product(i, i);
            if kii == 0.0 {
                continue;
            }
            let numerator = labels[i] - self.r[i];
            let raw_delta = numerator / kii;
            let (lo, hi) = box_bounds(labels[i], upper);
            let candidate = (self.alpha[i] + raw_delta).clamp(lo, hi);
            let delta = candidate - self.alpha[i];
            let gain = delta * (numerator - 0.5 * delta * kii);
            if gain > best_gain {
                best_gain = gain;
                best_index = i;
                best_alpha = candidate;
            }
        }

        self.kernel.set_alpha(&mut self.alpha, &mut self.r, best_index, best_alpha);
        self.iterations += 1;
        self.invalidate();
        best_gain.max(0.0)
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.invalidate();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        support_pairs(&self.kernel, &self.alpha)
    }
}

/// Biased SMO: adds an unregularized bias term, updated via pairwise
/// coordinate steps that keep the implicit equality constraint intact.
pub struct SmoBiased {
    kernel: KernelEngine,
    lambda: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    iterations: u64,
    bias: Dirty<f64>,
    norm_squared: Dirty<f64>,
}

impl SmoBiased {
    /// Builds a biased SMO optimizer with regularization `lambda`.
    #[must_use]
    pub fn new(kernel: KernelEngine, lambda: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        Self {
            kernel,
            lambda,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            iterations: 0,
            bias: Dirty::default(),
            norm_squared: Dirty::default(),
        }
    }

    fn upper(&self) -> f64 {
        1.0 / (self.lambda * self.training_size() as f64)
    }

    fn invalidate(&mut self) {
        self.bias.invalidate();
        self.norm_squared.invalidate();
    }

    fn pair_delta(
        e1: f64,
        e2: f64,
        k11: f64,
        k22: f64,
        k12: f64,
        a1: f64,
        a2: f64,
        bounds1: (f64, f64),
        bounds2: (f64, f64),
    ) -> f64 {
        let denom = k11 + k22 - 2.0 * k12;
        if denom <= 0.0 {
            return 0.0;
        }
        let raw = (e1 - e2) / denom;
        let (lo1, hi1) = bounds1;
        let (lo2, hi2) = bounds2;
        let bound1 = if raw >= 0.0 { hi1 - a1 } else { a1 - lo1 };
        let bound2 = if raw >= 0.0 { a2 - lo2 } else { hi2 - a2 };
        let max_magnitude = bound1.min(bound2).max(0.0);
        raw.clamp(-max_magnitude, max_magnitude)
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

impl Optimizer for SmoBiased {
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
        let (alpha, r, kernel, upper) = (&self.alpha, &self.r, &self.kernel, self.upper());
        self.bias.get_or_compute(|| {
            let labels = kernel.labels();
            let interior: Vec<f64> = (0..alpha.len())
                .filter(|&i| alpha[i].abs() > 0.0 && alpha[i].abs() < upper)
                .map(|i| labels[i] - r[i])
                .collect();
            if interior.is_empty() {
                0.0
            } else {
                interior.iter().sum::<f64>() / interior.len() as f64
            }
        })
    }

    fn norm_squared(&mut self) -> f64 {
        let (alpha, r) = (&self.alpha, &self.r);
        self.norm_squared.get_or_compute(|| {
            alpha.iter().zip(r.iter()).map(|(a, r)| a * r).sum()
        })
    }

    fn validation_responses(&self) -> Vec<f64> {
        let labels = self.kernel.labels();
        (self.training_size()..self.kernel.size())
            .map(|i| self.r[i] * labels[i].signum())
            .collect()
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        let raw = self.kernel.evaluate(x, &self.alpha);
        raw + self.bias()
    }

    fn iterate(&mut self, _rng: &mut dyn UniformSource) -> f64 {
        let upper = self.upper();
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();

        let mut index1 = None;
        let mut best_violation = 0.0;
        for i in 0..t {
            let e = labels[i] - self.r[i];
            let (lo, hi) = box_bounds(labels[i], upper);
            let eligible = if e > 0.0 { self.alpha[i] < hi } else { self.alpha[i] > lo };
            if eligible && e.abs() > best_violation {
                best_violation = e.abs();
                index1 = Some(i);
            }
        }
        let Some(index1) = index1 else {
            self.iterations += 1;
            return 0.0;
        };

        let row1 = self.kernel.row(index1);
        let e1 = labels[index1] - self.r[index1];
        let bounds1 = box_bounds(labels[index1], upper);

        let mut best_gain = f64::NEG_INFINITY;
        let mut best_index2 = None;
        let mut best_delta = 0.0;
        for j in 0..t {
            if j == index1 {
                continue;
            }
            let e2 = labels[j] - self.r[j];
            let k22 = self.kernel.kernel_inner_product(j, j);
            let k12 = row1[j];
            let bounds2 = box_bounds(labels[j], upper);
            let delta = Self::pair_delta(
                e1,
                e2,
                row1[index1],
                k22,
                k12,
                self.alpha[index1],
                self.alpha[j],
                bounds1,
                bounds2,
            );
            let denom = row1[index1] + k22 - 2.0 * k12;
            let gain = delta * ((e1 - e2) - 0.5 * delta * denom);
            if gain > best_gain {
                best_gain = gain;
                best_index2 = Some(j);
                best_delta = delta;
            }
        }

        let Some(index2) = best_index2 else {
            self.iterations += 1;
            return 0.0;
        };

        let new_alpha1 = self.alpha[index1] + best_delta;
        self.kernel.set_alpha_with_row(&mut self.alpha, &mut self.r, index1, new_alpha1, &row1);
        let new_alpha2 = self.alpha[index2] - best_delta;
        self.kernel.set_alpha(&mut self.alpha, &mut self.r, index2, new_alpha2);

        self.iterations += 1;
        self.invalidate();
        best_gain.max(0.0)
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.invalidate();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        support_pairs(&self.kernel, &self.alpha)
    }
}
