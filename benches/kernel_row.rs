//! Criterion benchmark for row-cache materialization cost under a Gaussian
//! kernel, with and without cache reuse.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use kernel_svm::prelude::*;

fn synthetic_vectors(n: usize) -> Vec<FeatureVector> {
    (0..n)
        .map(|i| {
            let base = (i % 8) * 2;
            let entries = vec![(base, (i as f64).sin() + 1.5), (base + 1, (i as f64).cos() + 1.5)];
            FeatureVector::Sparse(SparseVector::from_entries(entries))
        })
        .collect()
}

fn bench_row_cold(c: &mut Criterion) {
    c.bench_function("kernel_row_cold", |b| {
        let vectors = synthetic_vectors(200);
        let labels: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        b.iter(|| {
            let mut engine =
                KernelEngine::new(KernelKind::Gaussian { gamma: 0.5 }, vectors.clone(), labels.clone(), 200, 0);
            for i in 0..200 {
                black_box(engine.row(black_box(i)));
            }
        });
    });
}

fn bench_row_warm_cache(c: &mut Criterion) {
    c.bench_function("kernel_row_warm_cache", |b| {
        let vectors = synthetic_vectors(200);
        let labels: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut engine =
            KernelEngine::new(KernelKind::Gaussian { gamma: 0.5 }, vectors, labels, 200, 64);
        for i in 0..64 {
            engine.row(i);
        }
        b.iter(|| {
            for i in 0..64 {
                black_box(engine.row(black_box(i)));
            }
        });
    });
}

criterion_group!(benches, bench_row_cold, bench_row_warm_cache);
criterion_main!(benches);
