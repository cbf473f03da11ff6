//! Performance benchmarks for the bodygraph pipeline.
//!
//! Run with: `cargo bench --bench pipeline`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Longitude mapping | <100ns | Pure arithmetic plus one table lookup |
//! | Analysis + cross + fixing | <50µs | Pure, over an assembled chart |
//! | Full report, analytic | <5ms | ~30 Sun queries in the solver |
//! | Full report, cached | well under uncached | Repeated birth instant |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;

use bodygraph_kernel::{
    ActivationMapper, AnalyticEphemeris, BodygraphAnalyzer, BodygraphKernel, CachedEphemeris,
    CrossClassifier, FixingCalculator, PartnerPolicy, ReferenceTables,
};

fn tables() -> Arc<ReferenceTables> {
    Arc::new(ReferenceTables::builtin().expect("builtin tables"))
}

/// Benchmark longitude to (gate, line) mapping.
fn bench_mapping(c: &mut Criterion) {
    let tables = tables();
    let mapper = ActivationMapper::new(tables.wheel(), 3.875);
    let longitudes: Vec<f64> = (0..384).map(|i| i as f64 * 0.9375 + 0.4).collect();

    let mut group = c.benchmark_group("mapping");
    group.throughput(Throughput::Elements(longitudes.len() as u64));
    group.bench_function("all_slots", |b| {
        b.iter(|| {
            for &lon in &longitudes {
                black_box(mapper.map(black_box(lon)).expect("finite"));
            }
        })
    });
    group.finish();
}

/// Benchmark the pure classification stages over one chart.
fn bench_classification(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let tables = tables();
    let kernel = BodygraphKernel::new(Arc::new(AnalyticEphemeris), Arc::clone(&tables));
    let chart = rt
        .block_on(kernel.compute_str("1990-01-01T12:00:00Z"))
        .expect("report")
        .chart;

    let analyzer = BodygraphAnalyzer::new(&tables, PartnerPolicy::AnyMatch);
    let classifier = CrossClassifier::new(&tables);
    let fixing = FixingCalculator::new(&tables, PartnerPolicy::AnyMatch);

    let mut group = c.benchmark_group("classification");
    group.bench_function("analyze", |b| b.iter(|| analyzer.analyze(black_box(&chart))));
    group.bench_function("cross", |b| b.iter(|| classifier.classify(black_box(&chart))));
    group.bench_function("fixing", |b| b.iter(|| fixing.annotate_chart(black_box(&chart))));
    group.finish();
}

/// Benchmark the full pipeline, uncached and behind an LRU.
fn bench_full_report(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let births = [
        "1950-04-02T03:00:00Z",
        "1990-01-01T12:00:00Z",
        "2020-10-10T22:45:00Z",
    ];

    let analytic = BodygraphKernel::new(Arc::new(AnalyticEphemeris), tables());
    let cached = BodygraphKernel::new(
        Arc::new(CachedEphemeris::new(AnalyticEphemeris, 10_000)),
        tables(),
    );

    let mut group = c.benchmark_group("full_report");
    for birth in births {
        group.bench_with_input(BenchmarkId::new("analytic", birth), &birth, |b, &birth| {
            b.iter(|| rt.block_on(analytic.compute_str(black_box(birth))).expect("report"))
        });

        // Warm the cache
        rt.block_on(cached.compute_str(birth)).expect("report");
        group.bench_with_input(BenchmarkId::new("cached", birth), &birth, |b, &birth| {
            b.iter(|| rt.block_on(cached.compute_str(black_box(birth))).expect("report"))
        });
    }
    group.finish();

    let stats = cached.provider().cache_stats();
    assert!(stats.hits > stats.misses);
}

criterion_group!(benches, bench_mapping, bench_classification, bench_full_report);
criterion_main!(benches);
