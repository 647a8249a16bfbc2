// SPDX-License-Identifier: Apache-2.0

use peerbench_engine::{percentile_rank, score_confidence, select_cohort, ConfidenceInput};
use peerbench_model::{Borough, BuildingId, BuildingRecord};
use peerbench_policies::{BenchmarkPolicy, CohortPolicy};
use proptest::prelude::*;

const TYPES: [&str; 3] = ["walkup", "elevator", "coop"];

fn record_strategy() -> impl Strategy<Value = (usize, usize, u32, u16, Option<String>)> {
    (
        0usize..5,
        0usize..3,
        1u32..400,
        1880u16..2024,
        prop::option::of(prop::sample::select(vec![
            "astoria".to_string(),
            "harlem".to_string(),
            "park slope".to_string(),
        ])),
    )
}

fn build(idx: usize, fields: &(usize, usize, u32, u16, Option<String>)) -> BuildingRecord {
    let (borough, kind, units, year, neighborhood) = fields;
    let mut record = BuildingRecord::new(
        BuildingId::parse(&format!("b-{idx:03}")).expect("id"),
        Borough::ALL[*borough],
    )
    .with_building_type(TYPES[*kind])
    .expect("type")
    .with_unit_count(*units)
    .with_year_built(*year);
    if let Some(n) = neighborhood {
        record = record.with_neighborhood(n).expect("neighborhood");
    }
    record
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn percentile_rank_stays_within_bounds(
        target in -1.0e6f64..1.0e6,
        cohort in prop::collection::vec(-1.0e6f64..1.0e6, 0..64),
    ) {
        match percentile_rank(target, &cohort) {
            None => prop_assert!(cohort.is_empty()),
            Some(rank) => prop_assert!((0.0..=100.0).contains(&rank)),
        }
    }

    #[test]
    fn cohort_minimum_ranks_at_its_mid_rank(
        cohort in prop::collection::vec(0u32..50, 2..40),
    ) {
        let values: Vec<f64> = cohort.iter().map(|v| f64::from(*v)).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let ties = values.iter().filter(|v| **v == min).count();
        let expected = 0.5 * ties as f64 / values.len() as f64 * 100.0;
        let rank = percentile_rank(min, &values).expect("rank");
        prop_assert!((rank - expected).abs() < 1e-9);
    }

    #[test]
    fn widening_is_monotonic_and_bounded(
        fields in prop::collection::vec(record_strategy(), 1..60),
        min_size in 1usize..20,
    ) {
        let records: Vec<BuildingRecord> =
            fields.iter().enumerate().map(|(i, f)| build(i, f)).collect();
        let policy = CohortPolicy { min_cohort_size: min_size, ..CohortPolicy::default() };
        let target = &records[0];
        let cohort = select_cohort(target, &records, &policy);

        prop_assert!(cohort.widening_level <= policy.relaxable_dimensions());
        prop_assert!(cohort.widening_level <= policy.max_widening_steps);
        prop_assert_eq!(cohort.widening_level, cohort.steps.len());
        prop_assert!(!cohort.members.contains(&target.id));
        prop_assert!(cohort.steps.windows(2).all(|w| w[0].cohort_size <= w[1].cohort_size));
        if let Some(last) = cohort.steps.last() {
            prop_assert_eq!(last.cohort_size, cohort.size());
        }
        prop_assert_eq!(cohort.is_sufficient(), cohort.size() >= min_size);
        let mut sorted = cohort.members.clone();
        sorted.sort();
        prop_assert_eq!(sorted, cohort.members);
    }

    #[test]
    fn confidence_never_rises_with_more_widening(
        sample in 0usize..40,
        extra in 0usize..20,
        narrow in 0usize..6,
        more in 0usize..6,
    ) {
        let policy = BenchmarkPolicy::default();
        let cohort_size = sample + extra;
        let tight = score_confidence(&ConfidenceInput::new(sample, cohort_size, narrow), &policy);
        let loose = score_confidence(&ConfidenceInput::new(sample, cohort_size, narrow + more), &policy);
        prop_assert!(loose <= tight);
    }
}
