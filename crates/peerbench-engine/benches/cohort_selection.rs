// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use peerbench_engine::{compute_benchmark, select_cohort, PopulationSnapshot};
use peerbench_model::{Borough, BuildingId, BuildingRecord};
use peerbench_policies::BenchmarkPolicy;

const TYPES: [&str; 4] = ["walkup", "elevator", "coop", "condo"];

fn synthetic_population(count: usize) -> Vec<BuildingRecord> {
    (0..count)
        .map(|i| {
            let units = u32::try_from(5 + (i * 37) % 400).expect("units");
            let year = u16::try_from(1890 + (i * 13) % 130).expect("year");
            BuildingRecord::new(
                BuildingId::parse(&format!("b-{i:06}")).expect("id"),
                Borough::ALL[i % Borough::ALL.len()],
            )
            .with_building_type(TYPES[i % TYPES.len()])
            .expect("type")
            .with_unit_count(units)
            .with_year_built(year)
            .with_annual_tax_estimate(10_000.0 + (i % 997) as f64 * 31.0)
            .with_open_violations(u32::try_from(i % 23).expect("violations"))
            .with_compliance_cost_estimate(2_500.0 + (i % 311) as f64 * 17.0)
        })
        .collect()
}

fn bench_cohort_selection(c: &mut Criterion) {
    let records = synthetic_population(20_000);
    let policy = BenchmarkPolicy::default();
    let target = records[137].clone();
    c.bench_function("select_cohort_20k", |b| {
        b.iter(|| select_cohort(black_box(&target), records.iter(), &policy.cohort))
    });
}

fn bench_compute_benchmark(c: &mut Criterion) {
    let snapshot =
        PopulationSnapshot::from_records(synthetic_population(20_000)).expect("snapshot");
    let policy = BenchmarkPolicy::default();
    let id = BuildingId::parse("b-000137").expect("id");
    c.bench_function("compute_benchmark_20k", |b| {
        b.iter(|| compute_benchmark(black_box(&snapshot), black_box(&id), &policy))
    });
}

criterion_group!(benches, bench_cohort_selection, bench_compute_benchmark);
criterion_main!(benches);
