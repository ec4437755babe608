//! Criterion benchmarks for ranking and parsing metrics documents

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use regstats::services::Aggregator;
use regstats::types::{MetricsDocument, MonthlyDataPoint, OptimizedMetrics, SeriesValue};
use std::collections::BTreeMap;
use std::hint::black_box;
use std::path::PathBuf;

/// One metric with `names` entries, each a 24-month series
fn synthetic_metrics(names: usize) -> OptimizedMetrics {
    let mut inner = BTreeMap::new();
    for i in 0..names {
        let points = (0..24)
            .map(|m| {
                let year = 2022 + (m / 12) as i32;
                let month = (m % 12) as u32 + 1;
                // Spread totals so many names tie and the tiebreak is exercised
                MonthlyDataPoint::new(year, month, ((i * 7919) % 997) as u64)
            })
            .collect();
        inner.insert(format!("MAKER-{:06}", i), SeriesValue::TimeSeries(points));
    }

    let mut metrics = BTreeMap::new();
    metrics.insert("Vehicle Manufacturer".to_string(), inner);
    metrics
}

fn bench_ranked_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("ranking");

    // Either side of the parallel sort threshold
    for names in [1_000usize, 10_000, 100_000] {
        let metrics = synthetic_metrics(names);
        group.throughput(Throughput::Elements(names as u64));
        group.bench_with_input(
            BenchmarkId::new("ranked_names", names),
            &metrics,
            |b, metrics| {
                b.iter(|| Aggregator::ranked_names(black_box(metrics), "Vehicle Manufacturer"));
            },
        );
        group.bench_with_input(BenchmarkId::new("top_names_10", names), &metrics, |b, metrics| {
            b.iter(|| Aggregator::top_names(black_box(metrics), "Vehicle Manufacturer", 10));
        });
    }

    group.finish();
}

fn bench_record_total(c: &mut Criterion) {
    let metrics = synthetic_metrics(10_000);

    let mut group = c.benchmark_group("aggregate");
    group.bench_function("record_total", |b| {
        b.iter(|| Aggregator::record_total(black_box(&metrics)));
    });
    group.bench_function("monthly_trend", |b| {
        b.iter(|| Aggregator::monthly_trend(black_box(&metrics), "Vehicle Manufacturer", None));
    });
    group.finish();
}

fn bench_parse_document(c: &mut Criterion) {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("country.json");

    let bytes = match std::fs::read(&fixture) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => {
            eprintln!("Skipping parse_document: {} not found", fixture.display());
            return;
        }
    };

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("parse_document", |b| {
        b.iter(|| {
            let mut copy = bytes.clone();
            let _: Result<MetricsDocument, _> = simd_json::from_slice(black_box(&mut copy));
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_ranked_names,
    bench_record_total,
    bench_parse_document
);
criterion_main!(benches);
