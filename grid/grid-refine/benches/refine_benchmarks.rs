//! Benchmarks for grid-refine operations.
//!
//! Run with: cargo bench -p grid-refine
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p grid-refine -- --save-baseline main
//! 2. After changes: cargo bench -p grid-refine -- --baseline main

#![allow(missing_docs, clippy::unwrap_used, clippy::cast_possible_truncation)]

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use grid_refine::{
    RefineParams, RefinementFactor, SpatialIndex, TopologyRule, find_neighbors, find_violations,
    refine, regular_grid,
};
use grid_types::{Attributes, CellId, CellStore, Rect, Tolerance};

// =============================================================================
// Test Grid Generation
// =============================================================================

/// Square grid of `n` x `n` cells, each 100 units wide.
fn create_grid(n: u32) -> CellStore {
    let size = f64::from(n) * 100.0;
    regular_grid(
        &Rect::from_extents(0.0, 0.0, size, size),
        RefinementFactor::uniform(n),
        &Attributes::new(),
    )
    .unwrap()
}

/// Id of the cell in the middle of an `n` x `n` grid.
fn center_id(n: u32) -> CellId {
    let half = (n / 2) as usize;
    CellId::new(half * n as usize + half)
}

// =============================================================================
// Index and Neighbor Benchmarks
// =============================================================================

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("SpatialIndex");

    for n in [10u32, 50, 100] {
        let store = create_grid(n);
        group.throughput(Throughput::Elements(store.len() as u64));

        group.bench_with_input(BenchmarkId::new("build", n * n), &store, |b, store| {
            b.iter(|| SpatialIndex::build(black_box(store)));
        });

        let index = SpatialIndex::build(&store);
        let cell = store.get(center_id(n)).unwrap();
        let tol = Tolerance::default();
        group.bench_with_input(
            BenchmarkId::new("find_neighbors", n * n),
            &store,
            |b, store| b.iter(|| find_neighbors(black_box(cell), store, &index, &tol)),
        );
    }

    group.finish();
}

// =============================================================================
// Refinement Benchmarks
// =============================================================================

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Refine");

    let cases = [
        ("none_2x2", RefineParams::new()),
        ("modflow_2x2", RefineParams::modflow(RefinementFactor::uniform(2))),
        ("modflow_3x2", RefineParams::modflow(RefinementFactor::new(3, 2))),
        ("nested_4", RefineParams::nested(4)),
    ];

    for n in [10u32, 40] {
        let store = create_grid(n);
        let selection = [center_id(n)];

        for (name, params) in &cases {
            group.bench_with_input(BenchmarkId::new(*name, n * n), params, |b, params| {
                b.iter_batched(
                    || store.clone(),
                    |mut store| refine(&mut store, &selection, params).unwrap(),
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

fn bench_violations(c: &mut Criterion) {
    let mut group = c.benchmark_group("Violations");

    for n in [10u32, 40] {
        let mut store = create_grid(n);
        refine(&mut store, &[center_id(n)], &RefineParams::nested(4)).unwrap();
        let tol = Tolerance::default();

        group.throughput(Throughput::Elements(store.len() as u64));
        group.bench_with_input(BenchmarkId::new("nested", n * n), &store, |b, store| {
            b.iter(|| find_violations(black_box(store), TopologyRule::Nested, &tol));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_index, bench_refine, bench_violations);

criterion_main!(benches);
