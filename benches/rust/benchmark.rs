//! Epstein zeta evaluation benchmarks
//!
//! Benchmarks across dimension, exponent regime, and the regularised vs.
//! non-regularised entry points.

use criterion::{Criterion, criterion_group, criterion_main};
use epstein_zeta::{zeta, zeta_reg};
use std::hint::black_box;

// =============================================================================
// Fixed test lattices
// =============================================================================

const IDENTITY_3D: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

fn identity(d: usize) -> Vec<f64> {
    let mut m = vec![0.0_f64; d * d];
    for i in 0..d {
        m[i * d + i] = 1.0;
    }
    m
}

fn half_shift(d: usize) -> Vec<f64> {
    vec![0.5_f64; d]
}

fn zero_vec(d: usize) -> Vec<f64> {
    vec![0.0_f64; d]
}

// =============================================================================
// By dimension (generic branch, away from poles/resonances)
// =============================================================================

fn bench_by_dimension(c: &mut Criterion) {
    let mut group = c.benchmark_group("zeta_by_dimension");

    for &d in &[1_usize, 2, 3, 5, 8, 10] {
        let a = identity(d);
        let x = zero_vec(d);
        let y = half_shift(d);
        group.bench_function(format!("d{d}"), |b| {
            b.iter(|| zeta(black_box(1.3), d, black_box(&a), black_box(&x), black_box(&y)))
        });
    }

    group.finish();
}

// =============================================================================
// By exponent regime (small/large, near/away from resonance)
// =============================================================================

fn bench_by_exponent(c: &mut Criterion) {
    let mut group = c.benchmark_group("zeta_by_exponent");
    let x = zero_vec(3);
    let y = half_shift(3);

    for &nu in &[-7.5_f64, -0.5, 0.5, 2.9, 3.0, 3.1, 9.5] {
        group.bench_function(format!("nu{nu}"), |b| {
            b.iter(|| {
                zeta(
                    black_box(nu),
                    3,
                    black_box(&IDENTITY_3D),
                    black_box(&x),
                    black_box(&y),
                )
            })
        });
    }

    group.finish();
}

// =============================================================================
// Regularised vs. non-regularised at the same inputs
// =============================================================================

fn bench_regularised_vs_plain(c: &mut Criterion) {
    let mut group = c.benchmark_group("regularised_vs_plain");
    let x = [0.2_f64, 0.1, -0.4];
    let y = [0.1_f64, 0.2, 0.15];

    group.bench_function("zeta", |b| {
        b.iter(|| {
            zeta(
                black_box(1.7),
                3,
                black_box(&IDENTITY_3D),
                black_box(&x),
                black_box(&y),
            )
        })
    });

    group.bench_function("zeta_reg", |b| {
        b.iter(|| {
            zeta_reg(
                black_box(1.7),
                3,
                black_box(&IDENTITY_3D),
                black_box(&x),
                black_box(&y),
            )
        })
    });

    group.finish();
}

// =============================================================================
// Non-diagonal generator (exercises the infinity-norm truncation path)
// =============================================================================

fn bench_non_diagonal_lattice(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_diagonal_lattice");
    let sheared = [1.0_f64, 0.3, 0.0, 0.0, 1.0, 0.2, 0.0, 0.0, 1.0];
    let x = [0.1_f64, 0.0, 0.0];
    let y = [0.0_f64, 0.3, 0.3];

    group.bench_function("zeta", |b| {
        b.iter(|| {
            zeta(
                black_box(2.1),
                3,
                black_box(&sheared),
                black_box(&x),
                black_box(&y),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_by_dimension,
    bench_by_exponent,
    bench_regularised_vs_plain,
    bench_non_diagonal_lattice,
);

criterion_main!(benches);
