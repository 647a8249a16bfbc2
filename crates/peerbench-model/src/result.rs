// SPDX-License-Identifier: Apache-2.0

use crate::{BuildingId, DatasetVersion, MetricName, Polarity, SimilarityCriteria};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Ordinal trust label. Declaration order is the ordering: `Insufficient` is
/// the weakest, `High` the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ConfidenceTier {
    Insufficient,
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insufficient => "insufficient",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Weakest tier of the set; `None` when empty.
    pub fn weakest<I: IntoIterator<Item = Self>>(tiers: I) -> Option<Self> {
        tiers.into_iter().min()
    }
}

impl Display for ConfidenceTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricBenchmark {
    pub value: f64,
    /// Mid-rank percentile of `value` among peers holding this metric, 0..=100.
    pub percentile_rank: f64,
    /// Peers holding this metric.
    pub cohort_size: usize,
    pub completeness: f64,
    pub peer_median: f64,
    pub polarity: Polarity,
    pub confidence: ConfidenceTier,
}

impl MetricBenchmark {
    #[must_use]
    pub fn better_than_pct(&self) -> f64 {
        self.polarity.better_than_pct(self.percentile_rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingOnTarget,
    NoPeerValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkippedMetric {
    pub metric: MetricName,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CohortSummary {
    pub size: usize,
    pub widening_level: usize,
    pub criteria: SimilarityCriteria,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkResult {
    pub building_id: BuildingId,
    pub dataset_version: DatasetVersion,
    pub cohort: CohortSummary,
    pub metrics: BTreeMap<MetricName, MetricBenchmark>,
    pub skipped: Vec<SkippedMetric>,
    pub overall_confidence: ConfidenceTier,
}

impl BenchmarkResult {
    #[must_use]
    pub fn metric(&self, metric: MetricName) -> Option<&MetricBenchmark> {
        self.metrics.get(&metric)
    }
}
