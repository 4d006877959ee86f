//! Criterion benchmarks: sequential vs concurrent solve across worker counts.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hardy_bench::{beam_profile, bench_config, reference_profile};
use hardy_engine::{ConcurrentSolver, SequentialSolver};

fn bench_reference(c: &mut Criterion) {
    let frame = reference_profile();
    let mut group = c.benchmark_group("reference_2k");
    group.sample_size(20);

    group.bench_function("sequential", |b| {
        let solver = SequentialSolver::new(bench_config(1));
        b.iter_batched(
            || frame.clone(),
            |mut s| black_box(solver.solve(&mut s).unwrap()),
            BatchSize::LargeInput,
        );
    });

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("concurrent", workers),
            &workers,
            |b, &workers| {
                let solver = ConcurrentSolver::new(bench_config(workers));
                b.iter_batched(
                    || frame.clone(),
                    |s| black_box(solver.solve(s).unwrap()),
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_beam(c: &mut Criterion) {
    let frame = beam_profile();
    let mut group = c.benchmark_group("beam_500");
    group.sample_size(20);

    group.bench_function("sequential", |b| {
        let solver = SequentialSolver::new(bench_config(1));
        b.iter_batched(
            || frame.clone(),
            |mut s| black_box(solver.solve(&mut s).unwrap()),
            BatchSize::LargeInput,
        );
    });
    group.bench_function("concurrent_4", |b| {
        let solver = ConcurrentSolver::new(bench_config(4));
        b.iter_batched(
            || frame.clone(),
            |s| black_box(solver.solve(s).unwrap()),
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_reference, bench_beam);
criterion_main!(benches);
