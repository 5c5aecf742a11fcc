//! Criterion benchmarks for rate estimation and peak detection.
//!
//! Two benchmark groups:
//! - `estimate`: derivative sort and quantile pick over synthetic histories
//! - `rank_all`: four-dimension peak scan and ranking, top 10 per dimension

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use feescope_core::sample::max_complexity;
use feescope_core::test_utils::synthetic_history;
use feescope_stats::{estimate, rank_all};

const SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    group.sample_size(10);
    for &len in &SIZES {
        let samples = synthetic_history(len, 42);
        group.bench_with_input(BenchmarkId::from_parameter(len), &samples, |b, samples| {
            b.iter(|| estimate(samples, 0, 0.99).expect("estimate"));
        });
    }
    group.finish();
}

fn bench_rank_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_all");
    group.sample_size(10);
    for &len in &SIZES {
        let samples = synthetic_history(len, 42);
        let caps = max_complexity(&samples);
        let stats = estimate(&samples, 0, 0.99).expect("estimate");
        group.bench_with_input(BenchmarkId::from_parameter(len), &samples, |b, samples| {
            b.iter(|| rank_all(samples, &caps, &stats.target_rates, 10).expect("rank"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_estimate, bench_rank_all);
criterion_main!(benches);
