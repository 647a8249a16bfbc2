// SPDX-License-Identifier: Apache-2.0

use crate::{Borough, BuildingId, BuildingRecord, BuildingType};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Structural attribute a cohort can be constrained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityDimension {
    UnitBucket,
    Neighborhood,
    Borough,
    BuildingType,
    AgeBucket,
}

impl SimilarityDimension {
    pub const ALL: [Self; 5] = [
        Self::UnitBucket,
        Self::Neighborhood,
        Self::Borough,
        Self::BuildingType,
        Self::AgeBucket,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnitBucket => "unit_bucket",
            Self::Neighborhood => "neighborhood",
            Self::Borough => "borough",
            Self::BuildingType => "building_type",
            Self::AgeBucket => "age_bucket",
        }
    }
}

impl Display for SimilarityDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open `[lower, upper)` range; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketRange {
    pub lower: Option<u32>,
    pub upper: Option<u32>,
}

impl BucketRange {
    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        self.lower.is_none_or(|lo| value >= lo) && self.upper.is_none_or(|hi| value < hi)
    }

    /// Bucket of `value` among ascending `bounds`; `[10, 25]` yields
    /// `[.., 10)`, `[10, 25)` and `[25, ..)`.
    #[must_use]
    pub fn locate(value: u32, bounds: &[u32]) -> Self {
        let idx = bounds.partition_point(|b| *b <= value);
        Self {
            lower: idx.checked_sub(1).map(|i| bounds[i]),
            upper: bounds.get(idx).copied(),
        }
    }
}

impl Display for BucketRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.lower, self.upper) {
            (Some(lo), Some(hi)) => write!(f, "{lo}..{hi}"),
            (Some(lo), None) => write!(f, "{lo}.."),
            (None, Some(hi)) => write!(f, "..{hi}"),
            (None, None) => f.write_str(".."),
        }
    }
}

/// Constraints a cohort was built with. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimilarityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_bucket: Option<BucketRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borough: Option<Borough>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<BuildingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_bucket: Option<BucketRange>,
}

impl SimilarityCriteria {
    #[must_use]
    pub fn is_constrained(&self, dimension: SimilarityDimension) -> bool {
        match dimension {
            SimilarityDimension::UnitBucket => self.unit_bucket.is_some(),
            SimilarityDimension::Neighborhood => self.neighborhood.is_some(),
            SimilarityDimension::Borough => self.borough.is_some(),
            SimilarityDimension::BuildingType => self.building_type.is_some(),
            SimilarityDimension::AgeBucket => self.age_bucket.is_some(),
        }
    }

    #[must_use]
    pub fn active_dimensions(&self) -> Vec<SimilarityDimension> {
        SimilarityDimension::ALL
            .into_iter()
            .filter(|d| self.is_constrained(*d))
            .collect()
    }

    /// Drops the constraint on `dimension`; returns whether anything changed.
    pub fn relax(&mut self, dimension: SimilarityDimension) -> bool {
        let was = self.is_constrained(dimension);
        match dimension {
            SimilarityDimension::UnitBucket => self.unit_bucket = None,
            SimilarityDimension::Neighborhood => self.neighborhood = None,
            SimilarityDimension::Borough => self.borough = None,
            SimilarityDimension::BuildingType => self.building_type = None,
            SimilarityDimension::AgeBucket => self.age_bucket = None,
        }
        was
    }

    /// A record lacking the attribute never matches an active constraint.
    #[must_use]
    pub fn matches_dimension(&self, dimension: SimilarityDimension, record: &BuildingRecord) -> bool {
        match dimension {
            SimilarityDimension::UnitBucket => self
                .unit_bucket
                .is_none_or(|r| record.unit_count.is_some_and(|u| r.contains(u))),
            SimilarityDimension::Neighborhood => self
                .neighborhood
                .as_ref()
                .is_none_or(|n| record.neighborhood.as_ref() == Some(n)),
            SimilarityDimension::Borough => self.borough.is_none_or(|b| record.borough == b),
            SimilarityDimension::BuildingType => self
                .building_type
                .as_ref()
                .is_none_or(|t| record.building_type.as_ref() == Some(t)),
            SimilarityDimension::AgeBucket => self
                .age_bucket
                .is_none_or(|r| record.year_built.is_some_and(|y| r.contains(u32::from(y)))),
        }
    }

    #[must_use]
    pub fn matches(&self, record: &BuildingRecord) -> bool {
        SimilarityDimension::ALL
            .into_iter()
            .all(|d| self.matches_dimension(d, record))
    }

    /// Matches every active constraint except `skipped`.
    #[must_use]
    pub fn matches_except(&self, skipped: SimilarityDimension, record: &BuildingRecord) -> bool {
        SimilarityDimension::ALL
            .into_iter()
            .filter(|d| *d != skipped)
            .all(|d| self.matches_dimension(d, record))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WideningStep {
    pub relaxed: SimilarityDimension,
    /// Candidates this dimension alone was keeping out before the step.
    pub exclusions: usize,
    pub cohort_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortStatus {
    Sufficient,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeerCohort {
    pub target: BuildingId,
    /// Ordered by building id; never contains `target`.
    pub members: Vec<BuildingId>,
    pub initial_criteria: SimilarityCriteria,
    pub criteria: SimilarityCriteria,
    pub widening_level: usize,
    pub steps: Vec<WideningStep>,
    pub min_size: usize,
    pub status: CohortStatus,
}

impl PeerCohort {
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_sufficient(&self) -> bool {
        self.status == CohortStatus::Sufficient
    }
}
