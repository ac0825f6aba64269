//! Criterion micro-benchmarks for arena allocation and view refresh.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lamkit_arena::{ManagedBuffer, PAGE_SIZE};
use lamkit_bench::bench_memory;

/// Benchmark: allocate and free 256 mixed-size blocks.
fn bench_alloc_free_churn(c: &mut Criterion) {
    let mut memory = bench_memory().unwrap();
    let sizes: Vec<usize> = (0..256).map(|i| 16 + (i * 37) % 4096).collect();
    let mut live = Vec::with_capacity(sizes.len());

    c.bench_function("arena_alloc_free_256", |b| {
        b.iter(|| {
            for &size in &sizes {
                live.push(memory.allocate(size).unwrap());
            }
            // Free every other block first to exercise coalescing.
            for off in live.iter().step_by(2) {
                memory.free(*off).unwrap();
            }
            for off in live.iter().skip(1).step_by(2) {
                memory.free(*off).unwrap();
            }
            black_box(live.len());
            live.clear();
        });
    });
}

/// Benchmark: view a buffer through its cached descriptor.
fn bench_cached_view(c: &mut Criterion) {
    let mut memory = bench_memory().unwrap();
    let mut buffer = ManagedBuffer::<f32>::allocate(&mut memory, 16_384).unwrap();

    c.bench_function("managed_buffer_view_cached", |b| {
        b.iter(|| {
            let view = buffer.to_view(&memory).unwrap();
            black_box(view[0]);
        });
    });
}

/// Benchmark: re-derive a view after every growth.
fn bench_view_after_growth(c: &mut Criterion) {
    c.bench_function("managed_buffer_view_after_growth", |b| {
        b.iter(|| {
            let mut memory = bench_memory().unwrap();
            let mut buffer = ManagedBuffer::<u8>::from_slice(&mut memory, &[1; 1024]).unwrap();
            buffer.to_view(&memory).unwrap();
            let big = memory.allocate(32 * PAGE_SIZE).unwrap();
            let view = buffer.to_view(&memory).unwrap();
            black_box(view[0]);
            memory.free(big).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_churn,
    bench_cached_view,
    bench_view_after_growth
);
criterion_main!(benches);
