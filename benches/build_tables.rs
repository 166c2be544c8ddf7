//! Benchmarks for worlds-queries table construction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use seshat::task::{Task, TaskParams};

fn bench_add(c: &mut Criterion) {
    let params = TaskParams::default();
    c.bench_function("build_add_100x20", |bench| {
        bench.iter(|| black_box(Task::Add.build(&params).unwrap()))
    });
}

fn bench_base(c: &mut Criterion) {
    let params = TaskParams {
        n_concepts: 8,
        ..Default::default()
    };
    c.bench_function("build_base_6561x2", |bench| {
        bench.iter(|| black_box(Task::Base.build(&params).unwrap()))
    });
}

fn bench_forward_stop_full(c: &mut Criterion) {
    let params = TaskParams::default();
    c.bench_function("build_forward_stop_full_512x4", |bench| {
        bench.iter(|| black_box(Task::ForwardStopFull.build(&params).unwrap()))
    });
}

criterion_group!(benches, bench_add, bench_base, bench_forward_stop_full);
criterion_main!(benches);
