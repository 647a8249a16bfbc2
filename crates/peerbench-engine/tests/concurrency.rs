// SPDX-License-Identifier: Apache-2.0

use peerbench_engine::{compute_benchmark, BenchmarkEngine, InMemoryPopulation, PopulationSource};
use peerbench_model::{Borough, BuildingId, BuildingRecord};
use peerbench_policies::BenchmarkPolicy;
use std::sync::Arc;

fn population(count: usize, tax_offset: f64) -> Vec<BuildingRecord> {
    (0..count)
        .map(|i| {
            BuildingRecord::new(
                BuildingId::parse(&format!("bk-{i:03}")).expect("id"),
                Borough::Brooklyn,
            )
            .with_building_type("elevator")
            .expect("type")
            .with_unit_count(40)
            .with_annual_tax_estimate(1_000.0 + tax_offset + i as f64)
            .with_open_violations(u32::try_from(i % 7).expect("small"))
        })
        .collect()
}

#[test]
fn parallel_readers_agree_with_direct_computation() {
    let source = Arc::new(InMemoryPopulation::from_records(population(24, 0.0)).expect("source"));
    let engine = BenchmarkEngine::new(source.clone(), BenchmarkPolicy::default()).expect("engine");
    let snapshot = source.current().expect("snapshot");

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let engine = &engine;
            let snapshot = &snapshot;
            scope.spawn(move || {
                for i in (worker..24).step_by(3) {
                    let id = BuildingId::parse(&format!("bk-{i:03}")).expect("id");
                    let served = engine.benchmark(&id).expect("benchmark");
                    let direct = compute_benchmark(snapshot, &id, engine.policy())
                        .expect("direct");
                    assert_eq!(*served, direct);
                }
            });
        }
    });
    assert!(engine.cache_stats().entries <= 24);
}

#[test]
fn readers_see_exactly_one_version_while_it_is_swapped() {
    let source = Arc::new(InMemoryPopulation::from_records(population(16, 0.0)).expect("source"));
    let engine = BenchmarkEngine::new(source.clone(), BenchmarkPolicy::default()).expect("engine");
    let v1 = source.current_version().expect("v1");
    let replacement = population(16, 500.0);

    let v2 = std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let id = BuildingId::parse("bk-005").expect("id");
                    (0..50)
                        .map(|_| engine.benchmark(&id).expect("benchmark"))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let v2 = source.replace(replacement.clone()).expect("replace");
        for reader in readers {
            for result in reader.join().expect("reader") {
                assert!(result.dataset_version == v1 || result.dataset_version == v2);
                let tax = result
                    .metric(peerbench_model::MetricName::AnnualTax)
                    .expect("tax");
                let expected = if result.dataset_version == v1 { 1_005.0 } else { 1_505.0 };
                assert_eq!(tax.value, expected);
            }
        }
        v2
    });

    let latest = engine
        .benchmark(&BuildingId::parse("bk-005").expect("id"))
        .expect("latest");
    assert_eq!(latest.dataset_version, v2);
}
