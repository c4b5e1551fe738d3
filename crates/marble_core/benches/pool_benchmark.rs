//! # Slot Pool Benchmark
//!
//! A screen build allocates a few hundred widgets with a first-fit scan;
//! this keeps an eye on the worst case (table almost full).
//!
//! Run with: `cargo bench --package marble_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marble_core::SlotPool;

/// Widget table size used by the GUI.
const CAPACITY: usize = 512;

/// Benchmark: fill the whole table.
fn bench_fill(c: &mut Criterion) {
    c.bench_function("fill_512", |b| {
        b.iter(|| {
            let mut pool: SlotPool<u64> = SlotPool::new(CAPACITY);
            while let Some(i) = pool.allocate(0) {
                black_box(i);
            }
            pool.allocated_count()
        });
    });
}

/// Benchmark: churn a single slot at different fill levels.
fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");

    for fill in [16usize, 256, CAPACITY - 2] {
        group.bench_with_input(BenchmarkId::from_parameter(fill), &fill, |b, &fill| {
            let mut pool: SlotPool<u64> = SlotPool::new(CAPACITY);
            for _ in 0..fill {
                pool.allocate(1);
            }
            b.iter(|| {
                let i = pool.allocate(2).unwrap_or(0);
                black_box(pool.free(i));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fill, bench_churn);
criterion_main!(benches);
