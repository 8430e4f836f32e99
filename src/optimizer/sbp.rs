//! Stochastic Batch Perceptron: §4.4.4.
//!
//! Each iterate samples a random example from the current water-level's
//! "below threshold" set, takes a fixed-size step on it, projects `‖w‖²`
//! back into the unit ball, and folds the resulting α and r into a
//! [`StableSum`] running average. The reported classifier divides the
//! accumulated α by a κ_total re-derived from the accumulated responses, so
//! — as with [`super::perceptron`] — [`Optimizer::alphas`] exposes the raw,
//! unaveraged dual weights while [`Optimizer::evaluate`] and
//! [`Optimizer::write_support`] use the averaged classifier.

use super::Optimizer;
use crate::kernel::{Kernel, KernelEngine};
use crate::numeric_sum::StableSum;
use crate::rng::UniformSource;
use crate::vector::FeatureVector;
use crate::water::{water_level_biased, water_level_unbiased};

fn max_diagonal(kernel: &KernelEngine) -> f64 {
    (0..kernel.training_size())
        .map(|i| kernel.kernel_inner_product(i, i))
        .fold(0.0, f64::max)
}

/// Unbiased SBP: a single running water level over the signed responses.
pub struct SbpUnbiased {
    kernel: KernelEngine,
    nu: f64,
    k_max: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
    sum_alpha: Vec<StableSum>,
    sum_r: Vec<StableSum>,
}

impl SbpUnbiased {
    /// Builds an unbiased SBP optimizer with sampling rate `nu`.
    #[must_use]
    pub fn new(kernel: KernelEngine, nu: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        let k_max = max_diagonal(&kernel);
        Self {
            kernel,
            nu,
            k_max,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            norm_squared: 0.0,
            iterations: 0,
            sum_alpha: vec![StableSum::new(); t],
            sum_r: vec![StableSum::new(); t],
        }
    }

    fn signed_responses(&self) -> Vec<f64> {
        let labels = self.kernel.labels();
        (0..self.training_size()).map(|i| labels[i].signum() * self.r[i]).collect()
    }

    /// The averaged classifier `(Σₜ αₜ) / κ_total`, re-deriving κ_total from
    /// the accumulated mean responses.
    fn averaged_classifier(&self) -> (Vec<f64>, f64) {
        let labels = self.kernel.labels();
        let t = self.training_size() as f64;
        let count = self.iterations.max(1) as f64;
        let mean_r: Vec<f64> = self.sum_r.iter().map(|s| s.get() / count).collect();
        let signed_mean: Vec<f64> =
            (0..mean_r.len()).map(|i| labels[i].signum() * mean_r[i]).collect();
        let total = self.nu * t * (self.iterations as f64 + 1.0);
        let kappa_total = water_level_unbiased(&signed_mean, total);
        let classifier = self.sum_alpha.iter().map(|s| s.get() / kappa_total).collect();
        (classifier, kappa_total)
    }

    /// The accumulated `Σₜ αₜ` per training index.
    pub(crate) fn sum_alpha_totals(&self) -> Vec<f64> {
        self.sum_alpha.iter().map(StableSum::get).collect()
    }

    /// The accumulated `Σₜ rₜ` per training index.
    pub(crate) fn sum_r_totals(&self) -> Vec<f64> {
        self.sum_r.iter().map(StableSum::get).collect()
    }

    /// The current iteration counter.
    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Restores `α`, the iteration counter, and the running accumulators
    /// from a saved archive, recomputing `r` and every derived cache from
    /// scratch.
    pub(crate) fn restore(
        &mut self,
        alpha: Vec<f64>,
        iterations: u64,
        sum_alpha: Vec<f64>,
        sum_r: Vec<f64>,
    ) {
        self.alpha = alpha;
        self.iterations = iterations;
        self.sum_alpha = sum_alpha
            .into_iter()
            .map(|total| {
                let mut s = StableSum::new();
                s.add(total);
                s
            })
            .collect();
        self.sum_r = sum_r
            .into_iter()
            .map(|total| {
                let mut s = StableSum::new();
                s.add(total);
                s
            })
            .collect();
        Optimizer::recalculate(self);
    }
}

impl Optimizer for SbpUnbiased {
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
        let (classifier, _) = self.averaged_classifier();
        self.kernel.evaluate(x, &classifier)
    }

    fn iterate(&mut self, rng: &mut dyn UniformSource) -> f64 {
        let labels = self.kernel.labels().to_vec();
        let t = self.training_size();
        let signed = self.signed_responses();
        let total = self.nu * t as f64;
        let kappa = water_level_unbiased(&signed, total);

        let candidates: Vec<usize> = (0..t).filter(|&i| signed[i] < kappa).collect();
        let eta = 1.0 / (self.k_max * (self.iterations as f64 + 1.0)).sqrt();

        if !candidates.is_empty() {
            let pick = candidates[rng.uniform_below(candidates.len() as u64 - 1) as usize];
            let delta = labels[pick].signum() * eta;
            let new_alpha = self.alpha[pick] + delta;
            self.kernel.set_alpha(&mut self.alpha, &mut self.r, pick, new_alpha);

            self.norm_squared =
                self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
            if self.norm_squared > 1.0 {
                let scale = (1.0 / self.norm_squared).sqrt();
                for a in &mut self.alpha {
                    *a *= scale;
                }
                for x in &mut self.r {
                    *x *= scale;
                }
                self.norm_squared = 1.0;
            }
        }

        for i in 0..t {
            self.sum_alpha[i].add(self.alpha[i]);
            self.sum_r[i].add(self.r[i]);
        }
        self.iterations += 1;
        eta
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        let (classifier, _) = self.averaged_classifier();
        classifier
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a != 0.0)
            .map(|(i, &a)| (a, self.kernel.vectors()[i].clone()))
            .collect()
    }
}

/// Biased SBP: tracks two running water levels (positive/negative label
/// sides) and samples one index from each per iterate.
pub struct SbpBiased {
    kernel: KernelEngine,
    nu: f64,
    k_max: f64,
    alpha: Vec<f64>,
    r: Vec<f64>,
    norm_squared: f64,
    iterations: u64,
    sum_alpha: Vec<StableSum>,
    sum_r: Vec<StableSum>,
}

impl SbpBiased {
    /// Builds a biased SBP optimizer with sampling rate `nu`.
    #[must_use]
    pub fn new(kernel: KernelEngine, nu: f64) -> Self {
        let t = kernel.training_size();
        let n = kernel.size();
        let k_max = max_diagonal(&kernel);
        Self {
            kernel,
            nu,
            k_max,
            alpha: vec![0.0; t],
            r: vec![0.0; n],
            norm_squared: 0.0,
            iterations: 0,
            sum_alpha: vec![StableSum::new(); t],
            sum_r: vec![StableSum::new(); t],
        }
    }

    fn sides(&self) -> (Vec<usize>, Vec<f64>, Vec<usize>, Vec<f64>) {
        let labels = self.kernel.labels();
        let mut plus_idx = Vec::new();
        let mut plus_val = Vec::new();
        let mut minus_idx = Vec::new();
        let mut minus_val = Vec::new();
        for i in 0..self.training_size() {
            if labels[i] > 0.0 {
                plus_idx.push(i);
                plus_val.push(self.r[i]);
            } else {
                minus_idx.push(i);
                minus_val.push(-self.r[i]);
            }
        }
        (plus_idx, plus_val, minus_idx, minus_val)
    }

    fn averaged_classifier(&self) -> (Vec<f64>, f64) {
        let labels = self.kernel.labels();
        let t = self.training_size() as f64;
        let count = self.iterations.max(1) as f64;
        let mean_r: Vec<f64> = self.sum_r.iter().map(|s| s.get() / count).collect();
        let plus: Vec<f64> = (0..mean_r.len()).filter(|&i| labels[i] > 0.0).map(|i| mean_r[i]).collect();
        let minus: Vec<f64> =
            (0..mean_r.len()).filter(|&i| labels[i] <= 0.0).map(|i| -mean_r[i]).collect();
        let total = self.nu * t * (self.iterations as f64 + 1.0);
        let level = water_level_biased(&plus, &minus, total);
        let kappa_total = level.kappa();
        let classifier = self.sum_alpha.iter().map(|s| s.get() / kappa_total).collect();
        (classifier, level.bias())
    }

    /// The accumulated `Σₜ αₜ` per training index.
    pub(crate) fn sum_alpha_totals(&self) -> Vec<f64> {
        self.sum_alpha.iter().map(StableSum::get).collect()
    }

    /// The accumulated `Σₜ rₜ` per training index.
    pub(crate) fn sum_r_totals(&self) -> Vec<f64> {
        self.sum_r.iter().map(StableSum::get).collect()
    }

    /// The current iteration counter.
    pub(crate) fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Restores `α`, the iteration counter, and the running accumulators
    /// from a saved archive, recomputing `r` and every derived cache from
    /// scratch.
    pub(crate) fn restore(
        &mut self,
        alpha: Vec<f64>,
        iterations: u64,
        sum_alpha: Vec<f64>,
        sum_r: Vec<f64>,
    ) {
        self.alpha = alpha;
        self.iterations = iterations;
        self.sum_alpha = sum_alpha
            .into_iter()
            .map(|total| {
                let mut s = StableSum::new();
                s.add(total);
                s
            })
            .collect();
        self.sum_r = sum_r
            .into_iter()
            .map(|total| {
                let mut s = StableSum::new();
                s.add(total);
                s
            })
            .collect();
        Optimizer::recalculate(self);
    }
}

impl Optimizer for SbpBiased {
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
        let (_, bias) = self.averaged_classifier();
        bias
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
        let (classifier, bias) = self.averaged_classifier();
        self.kernel.evaluate(x, &classifier) + bias
    }

    fn iterate(&mut self, rng: &mut dyn UniformSource) -> f64 {
        let t = self.training_size();
        let (plus_idx, plus_val, minus_idx, minus_val) = self.sides();
        let total = self.nu * t as f64;
        let level = water_level_biased(&plus_val, &minus_val, total);

        let plus_candidates: Vec<usize> = plus_idx
            .iter()
            .zip(plus_val.iter())
            .filter(|&(_, &v)| v < level.kappa_plus)
            .map(|(&i, _)| i)
            .collect();
        let minus_candidates: Vec<usize> = minus_idx
            .iter()
            .zip(minus_val.iter())
            .filter(|&(_, &v)| v < level.kappa_minus)
            .map(|(&i, _)| i)
            .collect();

        let eta = 0.5 / (self.k_max * (self.iterations as f64 + 1.0)).sqrt();

        if !plus_candidates.is_empty() {
            let plus_pick = plus_candidates[rng.uniform_below(plus_candidates.len() as u64 - 1) as usize];
            let new_alpha = self.alpha[plus_pick] + eta;
            self.kernel.set_alpha(&mut self.alpha, &mut self.r, plus_pick, new_alpha);
        }
        if !minus_candidates.is_empty() {
            let minus_pick = minus_candidates[rng.uniform_below(minus_candidates.len() as u64 - 1) as usize];
            let new_alpha = self.alpha[minus_pick] - eta;
            self.kernel.set_alpha(&mut self.alpha, &mut self.r, minus_pick, new_alpha);
        }

        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
        if self.norm_squared > 1.0 {
            let scale = (1.0 / self.norm_squared).sqrt();
            for a in &mut self.alpha {
                *a *= scale;
            }
            for x in &mut self.r {
                *x *= scale;
            }
            self.norm_squared = 1.0;
        }

        for i in 0..t {
            self.sum_alpha[i].add(self.alpha[i]);
            self.sum_r[i].add(self.r[i]);
        }
        self.iterations += 1;
        eta
    }

    fn recalculate(&mut self) {
        self.kernel.recalculate_responses(&self.alpha, &mut self.r);
        self.norm_squared = self.alpha.iter().zip(self.r.iter()).map(|(a, r)| a * r).sum();
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        let (classifier, _) = self.averaged_classifier();
        classifier
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a != 0.0)
            .map(|(i, &a)| (a, self.kernel.vectors()[i].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::KernelKind;
    use crate::vector::SparseVector;

    /// A fixed-sequence source for tests that need deterministic index
    /// selection instead of a real generator's output.
    struct Scripted(std::collections::VecDeque<u64>);

    impl UniformSource for Scripted {
        fn next_u64(&mut self) -> u64 {
            0
        }

        fn uniform_below(&mut self, _bound: u64) -> u64 {
            self.0.pop_front().expect("scripted source exhausted")
        }
    }

    fn four_point_kernel(gamma: f64) -> KernelEngine {
        let vectors = vec![
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 1.0)])),
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 2.0)])),
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, -1.0)])),
            FeatureVector::Sparse(SparseVector::from_entries(vec![(0, -2.0)])),
        ];
        KernelEngine::new(
            KernelKind::Gaussian { gamma },
            vectors,
            vec![1.0, 1.0, -1.0, -1.0],
            4,
            8,
        )
    }

    #[test]
    fn biased_first_iterate_steps_scripted_indices_by_eta() {
        let mut rng = Scripted([0u64, 0u64].into());
        let mut sbp = SbpBiased::new(four_point_kernel(1.0), 0.1);
        let k_max = sbp.k_max;
        sbp.iterate(&mut rng);
        let eta = 0.5 / k_max.sqrt();
        assert_eq!(sbp.alpha[0], eta);
        assert_eq!(sbp.alpha[2], -eta);
        assert_eq!(sbp.alpha[1], 0.0);
        assert_eq!(sbp.alpha[3], 0.0);
    }

    #[test]
    fn unbiased_accumulators_grow_every_iterate() {
        let mut rng = Scripted([0u64; 8].into());
        let mut sbp = SbpUnbiased::new(four_point_kernel(1.0), 0.1);
        sbp.iterate(&mut rng);
        assert_eq!(sbp.iterations, 1);
        assert_eq!(sbp.sum_alpha[0].count(), 1);
    }

    #[test]
    fn norm_squared_projection_keeps_it_at_or_below_one() {
        let mut rng = Scripted(std::iter::repeat(0u64).take(64).collect());
        let mut sbp = SbpUnbiased::new(four_point_kernel(1.0), 0.5);
        for _ in 0..20 {
            sbp.iterate(&mut rng);
        }
        assert!(sbp.norm_squared() <= 1.0 + 1e-9);
    }
}
