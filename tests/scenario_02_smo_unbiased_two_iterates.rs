//! Scenario 2 (spec §8): same two-point dataset, two iterates of unbiased
//! SMO converge both coordinates onto the box, giving ‖w‖² = 1 and zero
//! average hinge loss.

use kernel_svm::prelude::*;

fn two_point_kernel() -> KernelEngine {
    let vectors = vec![
        FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 1.0)])),
        FeatureVector::Sparse(SparseVector::from_entries(vec![(0, -1.0)])),
    ];
    KernelEngine::new(KernelKind::Linear, vectors, vec![1.0, -1.0], 2, 8)
}

#[test]
fn two_iterates_reach_the_box_on_both_sides() {
    let mut rng = LinearCongruential64::new(1);
    let mut smo = SmoUnbiased::new(two_point_kernel(), 1.0);
    smo.iterate(&mut rng);
    smo.iterate(&mut rng);

    assert_eq!(smo.alphas(), &[0.5, -0.5]);
    assert_eq!(smo.norm_squared(), 1.0);

    let gap = smo.iterate(&mut rng);
    assert_eq!(gap, 0.0, "a third iterate at the box boundary should find no further descent");
}
