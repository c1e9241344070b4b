//! Benchmarks for distance computation, scoring and clustering.

use std::sync::Arc;
use std::time::Duration;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use term_fairness::analyzers::{Distribution, DistributionType};
use term_fairness::cluster::{GroupClusterer, LinkageMethod, PairwiseMatrix};
use term_fairness::dataset::Dataset;
use term_fairness::groups::ComparisonMode;
use term_fairness::metrics::{DistanceEngine, DistanceMetric};
use term_fairness::scorer::FairnessScorer;

const REGIONS: [&str; 8] = ["north", "south", "east", "west", "centre", "coast", "hills", "islands"];

fn synthetic_dataset(rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut region = Vec::with_capacity(rows);
    let mut salary = Vec::with_capacity(rows);
    let mut approved = Vec::with_capacity(rows);

    for _ in 0..rows {
        let index = rng.random_range(0..REGIONS.len());
        region.push(REGIONS[index]);
        salary.push(40_000.0 + index as f64 * 1_500.0 + rng.random::<f64>() * 20_000.0);
        approved.push((rng.random::<f64>() < 0.3 + index as f64 * 0.05) as i64);
    }

    Dataset::from_columns(vec![
        ("region", Arc::new(StringArray::from(region)) as ArrayRef),
        ("salary", Arc::new(Float64Array::from(salary)) as ArrayRef),
        ("approved", Arc::new(Int64Array::from(approved)) as ArrayRef),
    ])
    .unwrap()
}

fn bench_ordered_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_metrics");
    group.measurement_time(Duration::from_secs(8));

    let mut rng = StdRng::seed_from_u64(7);
    let engine = DistanceEngine::default();

    for size in [100, 1_000, 10_000] {
        let a = Distribution::Continuous((0..size).map(|_| rng.random::<f64>()).collect());
        let b = Distribution::Continuous((0..size).map(|_| rng.random::<f64>() + 0.1).collect());

        for metric in [
            DistanceMetric::KolmogorovSmirnov,
            DistanceMetric::EarthMovers,
            DistanceMetric::Hellinger,
            DistanceMetric::JensenShannon,
        ] {
            group.bench_with_input(BenchmarkId::new(metric.name(), size), &size, |bench, _| {
                bench.iter(|| {
                    engine.distance(
                        std::hint::black_box(&a),
                        std::hint::black_box(&b),
                        Some(metric),
                        DistributionType::Continuous,
                    )
                });
            });
        }
    }

    group.finish();
}

fn bench_score_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_modes");
    group.measurement_time(Duration::from_secs(10));

    for rows in [1_000, 10_000, 50_000] {
        let dataset = synthetic_dataset(rows, 42);
        for (target, label) in [("approved", "binary"), ("salary", "continuous")] {
            let scorer = FairnessScorer::new(dataset.clone(), target, ["region"]).unwrap();
            for mode in [ComparisonMode::All, ComparisonMode::Rest, ComparisonMode::Pairwise] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{label}_{mode}"), rows),
                    &scorer,
                    |bench, scorer| {
                        bench.iter(|| scorer.distribution_score(std::hint::black_box(Some(mode)), None));
                    },
                );
            }
        }
    }

    group.finish();
}

fn bench_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustering");
    group.measurement_time(Duration::from_secs(5));

    let mut rng = StdRng::seed_from_u64(11);
    for n in [8, 32, 128] {
        let points: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
        let labels: Vec<String> = (0..n).map(|i| format!("g{i}")).collect();
        let distances: Vec<Vec<f64>> = points
            .iter()
            .map(|x| points.iter().map(|y| (x - y).abs()).collect())
            .collect();
        let matrix = PairwiseMatrix::new(labels, distances).unwrap();

        for linkage in [LinkageMethod::Single, LinkageMethod::Average] {
            let clusterer = GroupClusterer::new(linkage);
            group.bench_with_input(BenchmarkId::new(linkage.as_str(), n), &matrix, |bench, matrix| {
                bench.iter(|| clusterer.cluster(std::hint::black_box(matrix)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_ordered_metrics, bench_score_modes, bench_clustering);

criterion_main!(benches);
