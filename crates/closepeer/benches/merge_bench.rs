//! Benchmarks for close-peer set operations
//!
//! Measures performance of:
//! - Merging a sample into a full set
//! - Answering a closeness query

use closepeer::{Candidate, ClosePeerConfig, ClosePeerSet, EuclideanCoord, NodeId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn candidates(count: u64, offset: u64) -> Vec<Candidate<EuclideanCoord>> {
    (0..count)
        .map(|i| {
            let id = i + offset;
            let x = (id * 7919 % 1000) as f64;
            let y = (id * 104_729 % 1000) as f64;
            Candidate::new(NodeId(id + 1), EuclideanCoord::new(x, y))
        })
        .collect()
}

fn full_set(max_size: usize) -> ClosePeerSet<EuclideanCoord> {
    let config = ClosePeerConfig { max_size, ..Default::default() };
    let mut set = ClosePeerSet::new(NodeId(0), config);
    set.bind_coord(EuclideanCoord::new(500.0, 500.0));
    set.merge(candidates(max_size as u64 * 2, 0));
    set
}

/// Benchmark merging a sample into a full set
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for &max_size in &[10usize, 50, 200] {
        let sample = candidates(20, 10_000);
        group.throughput(Throughput::Elements(sample.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(max_size), &max_size, |b, &size| {
            let base = full_set(size);
            b.iter(|| {
                let mut set = base.clone();
                black_box(set.merge(black_box(sample.clone())))
            })
        });
    }
    group.finish();
}

/// Benchmark answering a closeness query
fn bench_close_peers(c: &mut Criterion) {
    let mut group = c.benchmark_group("close_peers");

    for &max_size in &[10usize, 50, 200] {
        let set = full_set(max_size);
        let requester = EuclideanCoord::new(250.0, 750.0);
        group.bench_with_input(BenchmarkId::from_parameter(max_size), &set, |b, set| {
            b.iter(|| set.close_peers(black_box(&requester)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge, bench_close_peers);
criterion_main!(benches);
