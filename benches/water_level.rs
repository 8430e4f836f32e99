//! Criterion benchmark for the water-filling margin solver, unbiased and
//! biased, over a few thousand candidates.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use kernel_svm::water::{water_level_biased, water_level_unbiased};

fn synthetic_values(n: usize, shift: f64) -> Vec<f64> {
    (0..n).map(|i| ((i as f64) * 0.0173).sin() * 10.0 + shift).collect()
}

fn bench_unbiased(c: &mut Criterion) {
    c.bench_function("water_level_unbiased_4096", |b| {
        let values = synthetic_values(4096, 0.0);
        b.iter(|| black_box(water_level_unbiased(black_box(&values), black_box(500.0))));
    });
}

fn bench_biased(c: &mut Criterion) {
    c.bench_function("water_level_biased_4096", |b| {
        let p = synthetic_values(2048, 1.0);
        let q = synthetic_values(2048, -1.0);
        b.iter(|| black_box(water_level_biased(black_box(&p), black_box(&q), black_box(500.0))));
    });
}

criterion_group!(benches, bench_unbiased, bench_biased);
criterion_main!(benches);
