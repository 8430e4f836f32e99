//! Cross-cutting invariants and laws (spec §8) that every optimizer
//! variant and every feature vector representation must satisfy,
//! independent of any single numbered scenario.

use kernel_svm::prelude::*;
use kernel_svm::vector::DEFAULT_SKIP;

fn linear_two_point_kernel() -> KernelEngine {
    let vectors = vec![
        FeatureVector::Sparse(SparseVector::from_entries(vec![(0, 1.0)])),
        FeatureVector::Sparse(SparseVector::from_entries(vec![(0, -1.0)])),
    ];
    KernelEngine::new(KernelKind::Linear, vectors, vec![1.0, -1.0], 2, 8)
}

#[test]
fn recalculate_reproduces_the_same_responses_as_incremental_updates() {
    let mut rng = LinearCongruential64::new(3);
    let mut smo = SmoUnbiased::new(linear_two_point_kernel(), 1.0);
    smo.iterate(&mut rng);
    smo.iterate(&mut rng);

    let before = smo.alphas().to_vec();
    let before_norm = smo.norm_squared();
    smo.recalculate();

    assert_eq!(smo.alphas(), before.as_slice(), "recalculate must not change α");
    assert!((smo.norm_squared() - before_norm).abs() < 1e-9, "recalculate must reproduce ‖w‖²");
}

#[test]
fn norm_squared_is_never_negative_across_every_biased_variant() {
    let mut rng = LinearCongruential64::new(5);

    let mut smo = SmoBiased::new(linear_two_point_kernel(), 1.0);
    let mut perceptron = PerceptronBiased::new(linear_two_point_kernel(), 1.0);
    let mut sbp = SbpBiased::new(linear_two_point_kernel(), 0.5);

    for _ in 0..5 {
        smo.iterate(&mut rng);
        perceptron.iterate(&mut rng);
        sbp.iterate(&mut rng);
    }

    assert!(smo.norm_squared() >= 0.0);
    assert!(perceptron.norm_squared() >= 0.0);
    assert!(sbp.norm_squared() >= 0.0);
}

#[test]
fn smo_unbiased_alpha_sign_matches_its_example_label() {
    let mut rng = LinearCongruential64::new(1);
    let mut smo = SmoUnbiased::new(linear_two_point_kernel(), 1.0);
    for _ in 0..4 {
        smo.iterate(&mut rng);
    }
    let labels = [1.0, -1.0];
    for (alpha, label) in smo.alphas().iter().zip(labels) {
        assert!(*alpha * label >= 0.0, "a dual weight must never point against its own label");
    }
}

#[test]
fn sbp_projection_keeps_the_norm_at_or_below_one() {
    let mut rng = LinearCongruential64::new(9);
    let mut sbp = SbpUnbiased::new(linear_two_point_kernel(), 0.9);
    for _ in 0..30 {
        sbp.iterate(&mut rng);
    }
    assert!(sbp.norm_squared() <= 1.0 + 1e-9);
}

#[test]
fn identical_seeds_and_hyperparameters_produce_identical_alpha_trajectories() {
    let mut rng_a = LinearCongruential64::new(42);
    let mut rng_b = LinearCongruential64::new(42);
    let mut smo_a = SmoUnbiased::new(linear_two_point_kernel(), 1.0);
    let mut smo_b = SmoUnbiased::new(linear_two_point_kernel(), 1.0);

    for _ in 0..6 {
        let gap_a = smo_a.iterate(&mut rng_a);
        let gap_b = smo_b.iterate(&mut rng_b);
        assert_eq!(gap_a, gap_b);
        assert_eq!(smo_a.alphas(), smo_b.alphas());
    }
}

#[test]
fn inner_product_agrees_across_every_storage_representation() {
    let entries = vec![(0, 1.0), (2, 2.0), (5, -3.0)];
    let sparse = FeatureVector::Sparse(SparseVector::from_entries(entries.clone()));
    let span = FeatureVector::Span(SpanVector::from_sparse_entries(&entries, DEFAULT_SKIP));
    let dense = FeatureVector::Dense(DenseVector::from_values(vec![1.0, 0.0, 2.0, 0.0, 0.0, -3.0]));

    let pairs = [(&sparse, &span), (&sparse, &dense), (&span, &dense)];
    let reference = sparse.inner_product(&sparse);
    for (a, b) in pairs {
        assert!((a.inner_product(b) - reference).abs() < 1e-9, "every representation pair must agree");
        assert!((b.inner_product(a) - reference).abs() < 1e-9, "inner product must be symmetric");
    }
}

#[test]
fn norm_squared_agrees_across_every_storage_representation() {
    let entries = vec![(1, 3.0), (4, -4.0)];
    let sparse = FeatureVector::Sparse(SparseVector::from_entries(entries.clone()));
    let span = FeatureVector::Span(SpanVector::from_sparse_entries(&entries, DEFAULT_SKIP));
    let dense = FeatureVector::Dense(DenseVector::from_values(vec![0.0, 3.0, 0.0, 0.0, -4.0]));

    assert_eq!(sparse.norm_squared(), 25.0);
    assert_eq!(span.norm_squared(), 25.0);
    assert_eq!(dense.norm_squared(), 25.0);
}

#[test]
fn from_sparse_entries_round_trips_through_the_chosen_representation() {
    let entries = vec![(0, 1.0), (1, 2.0), (2, 3.0)];
    let chosen = FeatureVector::from_sparse_entries(entries.clone());
    let reference = FeatureVector::Sparse(SparseVector::from_entries(entries));
    assert!((chosen.inner_product(&reference) - reference.norm_squared()).abs() < 1e-9);
}
