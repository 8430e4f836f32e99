//! Fuzzing submodule on the unbiased water-level solver.

use honggfuzz::fuzz;
use kernel_svm::water::water_level_unbiased;

type Input = (Vec<f64>, f64);

fn main() {
    loop {
        fuzz!(|input: Input| {
            let (a, total) = input;
            if a.is_empty() || a.iter().any(|v| !v.is_finite()) || !total.is_finite() || total < 0.0 {
                return;
            }
            let kappa = water_level_unbiased(&a, total);
            assert!(kappa.is_finite());
        });
    }
}
