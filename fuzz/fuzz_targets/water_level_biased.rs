//! Fuzzing submodule on the biased water-level solver.

use honggfuzz::fuzz;
use kernel_svm::water::water_level_biased;

type Input = (Vec<f64>, Vec<f64>, f64);

fn main() {
    loop {
        fuzz!(|input: Input| {
            let (p, q, total) = input;
            let invalid = p.is_empty()
                || q.is_empty()
                || !total.is_finite()
                || total < 0.0
                || p.iter().any(|v| !v.is_finite())
                || q.iter().any(|v| !v.is_finite());
            if invalid {
                return;
            }
            let split = water_level_biased(&p, &q, total);
            assert!(split.kappa_plus.is_finite());
            assert!(split.kappa_minus.is_finite());
        });
    }
}
