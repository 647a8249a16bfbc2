// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Data model for peer benchmarking.
//!
//! Upstream building data marks "not yet populated" numbers with `0`. That
//! sentinel only exists on [`RawBuildingRecord`]; [`BuildingRecord`] carries
//! `Option` for every attribute and is the only shape the engine reads.
//!
//! ```compile_fail
//! use peerbench_model::ConfidenceTier;
//!
//! fn exhaustive(t: ConfidenceTier) -> u8 {
//!     match t {
//!         ConfidenceTier::Insufficient => 0,
//!         ConfidenceTier::Low => 1,
//!         ConfidenceTier::Medium => 2,
//!         ConfidenceTier::High => 3,
//!     }
//! }
//! ```

mod building;
mod cohort;
mod metric;
mod result;
mod serde_helpers;
mod version;

pub use building::{
    Borough, BuildingId, BuildingRecord, BuildingType, RawBuildingRecord, BUILDING_ID_MAX_LEN,
    BUILDING_TYPE_MAX_LEN, NEIGHBORHOOD_MAX_LEN,
};
pub use cohort::{
    BucketRange, CohortStatus, PeerCohort, SimilarityCriteria, SimilarityDimension, WideningStep,
};
pub use metric::{MetricName, MetricVector, Polarity};
pub use result::{
    BenchmarkResult, CohortSummary, ConfidenceTier, MetricBenchmark, SkipReason, SkippedMetric,
};
pub use version::{DatasetVersion, DATASET_VERSION_MAX_LEN};

pub const CRATE_NAME: &str = "peerbench-model";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);
