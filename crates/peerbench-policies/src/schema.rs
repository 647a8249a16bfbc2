// SPDX-License-Identifier: Apache-2.0

use crate::limits::{
    DEFAULT_AGE_BUCKET_BOUNDS, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_MIN_COHORT_SIZE,
    DEFAULT_UNIT_BUCKET_BOUNDS,
};
use peerbench_model::SimilarityDimension;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub enum PolicySchemaVersion {
    #[default]
    #[serde(rename = "1")]
    V1,
}

impl PolicySchemaVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1",
        }
    }
}

/// Complete engine policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkPolicy {
    pub schema_version: PolicySchemaVersion,
    #[serde(default)]
    pub cohort: CohortPolicy,
    #[serde(default)]
    pub confidence: ConfidencePolicy,
    #[serde(default)]
    pub cache: CachePolicy,
}

/// How cohorts are formed and widened.
///
/// `relaxation_order` is a list of tiers walked front to back. Inside a tier
/// the selector relaxes whichever still-active dimension keeps out the fewest
/// candidates. Dimensions absent from every tier are never relaxed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CohortPolicy {
    pub min_cohort_size: usize,
    pub max_widening_steps: usize,
    pub relaxation_order: Vec<Vec<SimilarityDimension>>,
    pub unit_bucket_bounds: Vec<u32>,
    pub age_bucket_bounds: Vec<u32>,
}

impl Default for CohortPolicy {
    fn default() -> Self {
        Self {
            min_cohort_size: DEFAULT_MIN_COHORT_SIZE,
            max_widening_steps: SimilarityDimension::ALL.len(),
            relaxation_order: vec![
                vec![SimilarityDimension::UnitBucket],
                vec![SimilarityDimension::Neighborhood],
                vec![SimilarityDimension::Borough],
                vec![SimilarityDimension::BuildingType],
                vec![SimilarityDimension::AgeBucket],
            ],
            unit_bucket_bounds: DEFAULT_UNIT_BUCKET_BOUNDS.to_vec(),
            age_bucket_bounds: DEFAULT_AGE_BUCKET_BOUNDS.to_vec(),
        }
    }
}

impl CohortPolicy {
    /// Number of dimensions the selector may relax, in order.
    #[must_use]
    pub fn relaxable_dimensions(&self) -> usize {
        self.relaxation_order.iter().map(Vec::len).sum()
    }
}

/// Tier thresholds. Evaluated top-down: high, then medium, then low; a metric
/// sample under `min_metric_sample` (never less than two) is always
/// insufficient.
///
/// | tier   | size                                        | widening               | completeness               |
/// |--------|---------------------------------------------|------------------------|----------------------------|
/// | high   | cohort >= high_size_multiplier * min cohort | <= high_max_widening   | >= high_min_completeness   |
/// | medium | sample >= min cohort                        | <= medium_max_widening | >= medium_min_completeness |
/// | low    | sample >= min_metric_sample                 | any                    | any                        |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidencePolicy {
    pub min_metric_sample: usize,
    pub high_size_multiplier: usize,
    pub high_max_widening: usize,
    pub high_min_completeness: f64,
    pub medium_max_widening: usize,
    pub medium_min_completeness: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            min_metric_sample: 2,
            high_size_multiplier: 2,
            high_max_widening: 0,
            high_min_completeness: 0.9,
            medium_max_widening: 2,
            medium_min_completeness: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}
