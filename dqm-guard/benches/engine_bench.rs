//! Benchmarks for rule evaluation, profiling and quick scans.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dqm_guard::analyzers::{quick_scan, DataProfiler};
use dqm_guard::core::{Dataset, Row};
use dqm_guard::engine::RuleEngine;
use dqm_guard::rules::catalog::{
    standard_rules, AGRICULTURE_AREA, SOWING_1_AREA, SOWING_2_ACR, SOWING_2_AREA,
};
use dqm_guard::rules::{AggregateRule, RowRule, Rule, RuleSet};
use std::time::Duration;

/// A collection sheet with `rows` rows, ten rows per entity and every
/// twentieth row repeated.
fn synthetic_sheet(rows: usize) -> Dataset {
    let rows = (0..rows)
        .map(|i| {
            let n = if i % 20 == 19 { i - 1 } else { i };
            let agri = 50.0 + (n % 37) as f64;
            let sowing_1 = (n % 41) as f64;
            let sowing_2 = if n % 7 == 0 { 0.0 } else { sowing_1 + (n % 5) as f64 };
            Row::new()
                .with("RID", format!("R{}", n / 10))
                .with("Village", format!("Village {}", n % 13))
                .with(AGRICULTURE_AREA, agri)
                .with(SOWING_1_AREA, sowing_1)
                .with("Sowing 1 Percentage", sowing_1 / agri * 100.0)
                .with(SOWING_2_AREA, sowing_2)
                .with("Sowing 2 Percentage", sowing_2 / agri * 100.0)
                .with(SOWING_2_ACR, if sowing_2 > 0.0 { "Maize" } else { "" })
        })
        .collect();
    Dataset::from_rows(rows)
}

fn custom_rules() -> RuleSet {
    RuleSet::from_rules(vec![
        Rule::row(1, RowRule::new(SOWING_2_AREA, "gte", SOWING_1_AREA).against_column()),
        Rule::row(2, RowRule::new("Village", "starts_with", "village")),
        Rule::aggregate(
            3,
            AggregateRule::new(SOWING_1_AREA, "sum_lte", AGRICULTURE_AREA)
                .against_column()
                .grouped_by("RID")
                .distinct(),
        ),
        Rule::aggregate(4, AggregateRule::new(AGRICULTURE_AREA, "avg_gt", "10")),
    ])
    .unwrap_or_default()
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");
    group.measurement_time(Duration::from_secs(8));

    let engine = RuleEngine::default();
    let catalog = standard_rules();
    let custom = custom_rules();

    for size in [100, 1_000, 10_000] {
        let dataset = synthetic_sheet(size);
        group.bench_with_input(BenchmarkId::new("catalog", size), &dataset, |b, dataset| {
            b.iter(|| engine.execute(std::hint::black_box(dataset), std::hint::black_box(&catalog)));
        });
        group.bench_with_input(BenchmarkId::new("custom", size), &dataset, |b, dataset| {
            b.iter(|| engine.execute(std::hint::black_box(dataset), std::hint::black_box(&custom)));
        });
    }

    group.finish();
}

fn bench_analyzers(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzers");
    group.measurement_time(Duration::from_secs(5));

    let profiler = DataProfiler::new();
    for size in [1_000, 10_000] {
        let dataset = synthetic_sheet(size);
        group.bench_with_input(BenchmarkId::new("profile", size), &dataset, |b, dataset| {
            b.iter(|| profiler.profile(std::hint::black_box(dataset)));
        });
        group.bench_with_input(BenchmarkId::new("quick_scan", size), &dataset, |b, dataset| {
            b.iter(|| quick_scan(std::hint::black_box(dataset)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_execute, bench_analyzers);
criterion_main!(benches);
