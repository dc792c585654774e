//! Performance benchmarks for the exposure engine.
//!
//! This benchmark suite covers:
//! - A full report over the sample dataset through the HTTP router
//! - The report pipeline on synthetic months of 100 to 10,000 units
//! - The metric adjuster alone
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use exposure_engine::api::{AppState, create_router};
use exposure_engine::calculation::{adjust_units, build_report};
use exposure_engine::config::{ConfigLoader, NamedWeights};
use exposure_engine::data::{Dataset, DatasetLoader, PackageTable};
use exposure_engine::models::{
    ComputationMode, CorrectionRow, CorrectionTable, DemographicFilter, DemographicRecord, Gender,
    MediaType, MediaUnit, PackageContext, PackageType, ReportOptions, SelectionQuery, ShelterType,
    SortKey,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const SHELTER_TYPES: [ShelterType; 5] = [
    ShelterType::RoadsideShelter,
    ShelterType::MedianBusShelter,
    ShelterType::TransferCenter,
    ShelterType::TouristInfoPanel,
    ShelterType::VillageBusShelter,
];

/// Creates a month of `unit_count` units with two demographic rows each.
fn create_synthetic_dataset(unit_count: usize) -> Dataset {
    let units: Vec<MediaUnit> = (0..unit_count)
        .map(|i| MediaUnit {
            id: format!("{}", 10_000 + i),
            month: "202501".to_string(),
            name: format!("Unit {}", i),
            shelter_type: Some(SHELTER_TYPES[i % SHELTER_TYPES.len()].clone()),
            media_type: Some(if i % 2 == 0 {
                MediaType::Digital
            } else {
                MediaType::Poster
            }),
            package_type: PackageType::Poster,
            stay_time: (i % 3 != 0).then_some((i % 20) as f64),
            share_of_time: Some(0.1 + (i % 5) as f64 * 0.05),
            raw_rots: 1000.0 + (i % 97) as f64 * 13.0,
            raw_reach: 400.0 + (i % 89) as f64 * 7.0,
            latitude: Some(37.5),
            longitude: Some(127.0),
            grade: None,
        })
        .collect();

    let demographics: Vec<DemographicRecord> = units
        .iter()
        .flat_map(|unit| {
            [Gender::Female, Gender::Male].map(|gender| DemographicRecord {
                unit_id: unit.id.clone(),
                month: unit.month.clone(),
                gender,
                age: 2 + (unit.raw_rots as usize % 5) as u8,
                rots: unit.raw_rots / 2.0,
                reach: unit.raw_reach / 2.0,
            })
        })
        .collect();

    let correction = CorrectionTable::new(
        (1..=100)
            .map(|quantity| CorrectionRow {
                quantity,
                correction_factor: 1.0 / (1.0 + quantity as f64 * 0.01),
            })
            .collect(),
    );

    Dataset::new(units, demographics, correction)
}

fn create_query() -> SelectionQuery {
    SelectionQuery {
        month: "202501".to_string(),
        context: PackageContext::AllDigital,
        shelter_type: None,
        media_type: None,
        search: None,
        demographic: DemographicFilter::default(),
    }
}

/// Benchmark: Sample report through the HTTP router.
fn bench_sample_report(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    let tables = rt
        .block_on(DatasetLoader::load("./data/sample"))
        .expect("Failed to load data");
    let router = create_router(AppState::new(config, tables));
    let body = serde_json::json!({
        "month": "202501",
        "context": {"kind": "all_digital"},
        "top_n": 3
    })
    .to_string();

    c.bench_function("sample_report_http", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/report")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Report pipeline scaling with month size.
fn bench_report_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_scaling");
    let packages = PackageTable::default();
    let weights = NamedWeights::default();
    let query = create_query();
    let options = ReportOptions {
        mode: ComputationMode::Default,
        sort_by: SortKey::Rots,
        top_n: Some(50),
    };

    for unit_count in [100, 1_000, 10_000] {
        let dataset = create_synthetic_dataset(unit_count);
        group.throughput(Throughput::Elements(unit_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(unit_count),
            &dataset,
            |b, dataset| {
                b.iter(|| {
                    black_box(build_report(
                        dataset,
                        &packages,
                        &weights,
                        &query,
                        &options,
                    ))
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: Metric adjuster over 10,000 units.
fn bench_adjust_units(c: &mut Criterion) {
    let dataset = create_synthetic_dataset(10_000);

    let mut group = c.benchmark_group("metric_adjustment");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("adjust_10000", |b| {
        b.iter(|| black_box(adjust_units(dataset.units(), ComputationMode::Default)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_sample_report,
    bench_report_scaling,
    bench_adjust_units,
);
criterion_main!(benches);
