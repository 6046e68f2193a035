//! Mock Operations Benchmarks
//!
//! Benchmarks for mock invocation, override resolution and ledger inspection.
//!
//! Run with: `cargo bench --bench mock_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use probar_mock::prelude::*;

fn bench_invocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("invocation");

    group.bench_function("base_implementation", |bench| {
        let mock = mock_fn(|(x,): (u64,)| x + 1);
        bench.iter(|| {
            let out = mock.call(black_box((7,)));
            mock.clear();
            out
        });
    });

    group.bench_function("permanent_override", |bench| {
        let mock = mock_fn(|(x,): (u64,)| x + 1);
        mock.return_value_always(3);
        bench.iter(|| {
            let out = mock.call(black_box((7,)));
            mock.clear();
            out
        });
    });

    group.bench_function("absent_value", |bench| {
        let mock: MockFn<(u64,), String> = MockFn::default();
        bench.iter(|| {
            let out = mock.call(black_box((7,)));
            mock.clear();
            out
        });
    });

    group.bench_function("spy", |bench| {
        let spied = spy(|(x,): (u64,)| x * 2);
        bench.iter(|| {
            let out = spied.call(black_box((7,)));
            spied.clear();
            out
        });
    });

    group.finish();
}

fn bench_once_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("once_queue");

    for depth in [1_usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |bench, &depth| {
            let mock = mock_fn(|(): ()| 0_usize);
            bench.iter(|| {
                for i in 0..depth {
                    mock.return_value_once(i);
                }
                for _ in 0..depth {
                    black_box(mock.call(()));
                }
                mock.clear();
            });
        });
    }

    group.finish();
}

fn bench_inspection(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspection");

    for calls in [10_usize, 1_000] {
        let mock = mock_fn(|(x,): (usize,)| x);
        for i in 0..calls {
            mock.call((i,));
        }

        group.bench_with_input(BenchmarkId::new("calls", calls), &mock, |bench, mock| {
            bench.iter(|| black_box(mock.calls()));
        });
        group.bench_with_input(BenchmarkId::new("returns", calls), &mock, |bench, mock| {
            bench.iter(|| black_box(mock.returns()));
        });
        group.bench_with_input(BenchmarkId::new("called_with", calls), &mock, |bench, mock| {
            bench.iter(|| MockAssertion::called_with(mock, black_box(&(calls - 1,))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_invocation, bench_once_queue, bench_inspection);
criterion_main!(benches);
