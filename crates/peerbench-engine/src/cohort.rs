// SPDX-License-Identifier: Apache-2.0

use peerbench_model::{
    BucketRange, BuildingRecord, CohortStatus, PeerCohort, SimilarityCriteria,
    SimilarityDimension, WideningStep,
};
use peerbench_policies::CohortPolicy;
use tracing::debug;

/// Narrowest criteria for `target`: every dimension it has a value for.
/// Bucket dimensions stay open when the policy configures no bounds.
#[must_use]
pub fn initial_criteria(target: &BuildingRecord, policy: &CohortPolicy) -> SimilarityCriteria {
    SimilarityCriteria {
        unit_bucket: target
            .unit_count
            .filter(|_| !policy.unit_bucket_bounds.is_empty())
            .map(|units| BucketRange::locate(units, &policy.unit_bucket_bounds)),
        neighborhood: target.neighborhood.clone(),
        borough: Some(target.borough),
        building_type: target.building_type.clone(),
        age_bucket: target
            .year_built
            .filter(|_| !policy.age_bucket_bounds.is_empty())
            .map(|year| BucketRange::locate(u32::from(year), &policy.age_bucket_bounds)),
    }
}

/// Selects peers for `target` from `population`, widening one dimension at a
/// time until the cohort reaches `min_cohort_size` or the widening budget is
/// spent. The target is never its own peer.
pub fn select_cohort<'a, I>(
    target: &BuildingRecord,
    population: I,
    policy: &CohortPolicy,
) -> PeerCohort
where
    I: IntoIterator<Item = &'a BuildingRecord>,
{
    let candidates: Vec<&BuildingRecord> = population
        .into_iter()
        .filter(|record| record.id != target.id)
        .collect();
    let initial = initial_criteria(target, policy);
    let mut criteria = initial.clone();
    let mut size = count_matching(&candidates, &criteria);
    let mut steps = Vec::new();

    'widen: for tier in &policy.relaxation_order {
        loop {
            if size >= policy.min_cohort_size || steps.len() >= policy.max_widening_steps {
                break 'widen;
            }
            let Some((dimension, exclusions)) = tier
                .iter()
                .copied()
                .filter(|d| criteria.is_constrained(*d))
                .map(|d| (d, exclusions(&candidates, &criteria, d)))
                .min_by_key(|(_, excluded)| *excluded)
            else {
                break;
            };
            criteria.relax(dimension);
            size = count_matching(&candidates, &criteria);
            debug!(
                building_id = %target.id,
                relaxed = %dimension,
                exclusions,
                cohort_size = size,
                "cohort widened"
            );
            steps.push(WideningStep {
                relaxed: dimension,
                exclusions,
                cohort_size: size,
            });
        }
    }

    let mut members: Vec<_> = candidates
        .iter()
        .filter(|record| criteria.matches(record))
        .map(|record| record.id.clone())
        .collect();
    members.sort();
    let status = if members.len() >= policy.min_cohort_size {
        CohortStatus::Sufficient
    } else {
        CohortStatus::Insufficient
    };
    PeerCohort {
        target: target.id.clone(),
        members,
        initial_criteria: initial,
        criteria,
        widening_level: steps.len(),
        steps,
        min_size: policy.min_cohort_size,
        status,
    }
}

fn count_matching(candidates: &[&BuildingRecord], criteria: &SimilarityCriteria) -> usize {
    candidates.iter().filter(|r| criteria.matches(r)).count()
}

/// Candidates matching every other active dimension but failing `dimension`.
fn exclusions(
    candidates: &[&BuildingRecord],
    criteria: &SimilarityCriteria,
    dimension: SimilarityDimension,
) -> usize {
    candidates
        .iter()
        .filter(|r| criteria.matches_except(dimension, r) && !criteria.matches_dimension(dimension, r))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerbench_model::{Borough, BuildingId};

    fn building(id: &str, borough: Borough, kind: &str, units: u32) -> BuildingRecord {
        BuildingRecord::new(BuildingId::parse(id).expect("id"), borough)
            .with_building_type(kind)
            .expect("type")
            .with_unit_count(units)
    }

    #[test]
    fn initial_criteria_covers_present_attributes_only() {
        let target = building("t", Borough::Brooklyn, "walkup", 12);
        let criteria = initial_criteria(&target, &CohortPolicy::default());
        assert_eq!(
            criteria.active_dimensions(),
            vec![
                SimilarityDimension::UnitBucket,
                SimilarityDimension::Borough,
                SimilarityDimension::BuildingType,
            ]
        );
        assert_eq!(
            criteria.unit_bucket,
            Some(BucketRange { lower: Some(6), upper: Some(20) })
        );
    }

    #[test]
    fn sufficient_cohort_needs_no_widening() {
        let target = building("t", Borough::Queens, "elevator", 30);
        let population: Vec<_> = (0..10)
            .map(|i| building(&format!("p{i}"), Borough::Queens, "elevator", 40))
            .chain(std::iter::once(target.clone()))
            .collect();
        let cohort = select_cohort(&target, &population, &CohortPolicy::default());
        assert_eq!(cohort.widening_level, 0);
        assert_eq!(cohort.size(), 10);
        assert!(cohort.is_sufficient());
        assert!(!cohort.members.contains(&target.id));
    }

    #[test]
    fn widening_relaxes_unit_bucket_first() {
        let target = building("t", Borough::Queens, "elevator", 30);
        let mut population: Vec<_> = (0..3)
            .map(|i| building(&format!("near{i}"), Borough::Queens, "elevator", 30))
            .collect();
        population.extend((0..6).map(|i| building(&format!("big{i}"), Borough::Queens, "elevator", 300)));
        let cohort = select_cohort(&target, &population, &CohortPolicy::default());
        assert_eq!(cohort.widening_level, 1);
        assert_eq!(cohort.steps[0].relaxed, SimilarityDimension::UnitBucket);
        assert_eq!(cohort.steps[0].exclusions, 6);
        assert_eq!(cohort.size(), 9);
    }

    #[test]
    fn tier_ties_prefer_the_dimension_excluding_fewest() {
        let target = building("t", Borough::Queens, "elevator", 30);
        let population = vec![
            building("a", Borough::Queens, "walkup", 30),
            building("b", Borough::Bronx, "elevator", 30),
            building("c", Borough::Bronx, "elevator", 30),
        ];
        let policy = CohortPolicy {
            min_cohort_size: 2,
            max_widening_steps: 1,
            relaxation_order: vec![vec![
                SimilarityDimension::BuildingType,
                SimilarityDimension::Borough,
            ]],
            ..CohortPolicy::default()
        };
        let cohort = select_cohort(&target, &population, &policy);
        assert_eq!(cohort.steps[0].relaxed, SimilarityDimension::BuildingType);
        assert_eq!(cohort.steps[0].exclusions, 1);
        assert_eq!(cohort.status, CohortStatus::Insufficient);
    }

    #[test]
    fn widening_stops_at_budget_and_marks_insufficient() {
        let target = building("t", Borough::Bronx, "coop", 30);
        let population = vec![building("a", Borough::Queens, "rental", 500)];
        let policy = CohortPolicy {
            max_widening_steps: 2,
            ..CohortPolicy::default()
        };
        let cohort = select_cohort(&target, &population, &policy);
        assert_eq!(cohort.widening_level, 2);
        assert_eq!(cohort.status, CohortStatus::Insufficient);
    }
}
