// SPDX-License-Identifier: Apache-2.0

use peerbench_core::MachineError;
use peerbench_model::{BuildingId, DatasetVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BenchmarkErrorCode {
    InsufficientCohort,
    StaleVersion,
    UnknownBuilding,
    NotBenchmarkable,
    Population,
}

impl BenchmarkErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientCohort => "insufficient_cohort",
            Self::StaleVersion => "stale_version_requested",
            Self::UnknownBuilding => "unknown_building",
            Self::NotBenchmarkable => "not_benchmarkable",
            Self::Population => "population_unavailable",
        }
    }
}

/// Typed "cannot benchmark" outcomes. None of them is fatal; callers render
/// them (e.g. "not enough comparable buildings yet").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BenchmarkError {
    #[error(
        "building `{building_id}` has {cohort_size} comparable buildings after {widening_level} widening steps; {required} required"
    )]
    InsufficientCohort {
        building_id: BuildingId,
        cohort_size: usize,
        required: usize,
        widening_level: usize,
    },
    #[error("dataset version `{requested}` is no longer resident; current version is `{current}`")]
    StaleVersionRequested {
        requested: DatasetVersion,
        current: DatasetVersion,
    },
    #[error("building `{building_id}` is not part of dataset `{version}`")]
    UnknownBuilding {
        building_id: BuildingId,
        version: DatasetVersion,
    },
    #[error("building `{building_id}` has no populated metrics to benchmark")]
    NotBenchmarkable { building_id: BuildingId },
    #[error("population unavailable: {0}")]
    Population(String),
}

impl BenchmarkError {
    #[must_use]
    pub const fn code(&self) -> BenchmarkErrorCode {
        match self {
            Self::InsufficientCohort { .. } => BenchmarkErrorCode::InsufficientCohort,
            Self::StaleVersionRequested { .. } => BenchmarkErrorCode::StaleVersion,
            Self::UnknownBuilding { .. } => BenchmarkErrorCode::UnknownBuilding,
            Self::NotBenchmarkable { .. } => BenchmarkErrorCode::NotBenchmarkable,
            Self::Population(_) => BenchmarkErrorCode::Population,
        }
    }

    #[must_use]
    pub fn to_machine_error(&self) -> MachineError {
        let base = MachineError::new(self.code().as_str(), &self.to_string());
        match self {
            Self::InsufficientCohort {
                building_id,
                cohort_size,
                required,
                widening_level,
            } => base
                .with_detail("building_id", building_id.as_str())
                .with_detail("cohort_size", &cohort_size.to_string())
                .with_detail("required", &required.to_string())
                .with_detail("widening_level", &widening_level.to_string()),
            Self::StaleVersionRequested { requested, current } => base
                .with_detail("requested", requested.as_str())
                .with_detail("current", current.as_str()),
            Self::UnknownBuilding {
                building_id,
                version,
            } => base
                .with_detail("building_id", building_id.as_str())
                .with_detail("version", version.as_str()),
            Self::NotBenchmarkable { building_id } => {
                base.with_detail("building_id", building_id.as_str())
            }
            Self::Population(_) => base,
        }
    }
}
