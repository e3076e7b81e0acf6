//! Criterion benchmarks for whole outer iterations and full solves.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lidflow_bench::{reference_profile, stress_profile};
use lidflow_core::ProgressReport;
use lidflow_solver::{solve, Solver};

fn bench_iteration_41(c: &mut Criterion) {
    let mut solver = Solver::new(&reference_profile(usize::MAX)).unwrap();
    let mut sink = |_: &ProgressReport| {};

    // Warm up past the start-up transient.
    for _ in 0..10 {
        solver.step(&mut sink).unwrap();
    }

    c.bench_function("iteration_41x41", |b| {
        b.iter(|| {
            let phase = solver.step(&mut sink).unwrap();
            black_box(phase);
        });
    });
}

fn bench_iteration_129(c: &mut Criterion) {
    let mut solver = Solver::new(&stress_profile(usize::MAX)).unwrap();
    let mut sink = |_: &ProgressReport| {};
    for _ in 0..10 {
        solver.step(&mut sink).unwrap();
    }

    c.bench_function("iteration_129x129", |b| {
        b.iter(|| {
            let phase = solver.step(&mut sink).unwrap();
            black_box(phase);
        });
    });
}

fn bench_100_iterations_41(c: &mut Criterion) {
    let params = reference_profile(100);
    c.bench_function("100_iterations_41x41", |b| {
        b.iter(|| {
            let result = solve(&params, None).unwrap();
            black_box(&result);
        });
    });
}

criterion_group!(
    benches,
    bench_iteration_41,
    bench_iteration_129,
    bench_100_iterations_41
);
criterion_main!(benches);
