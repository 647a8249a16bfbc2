// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod limits;
mod schema;
mod validate;

pub use limits::{
    DEFAULT_AGE_BUCKET_BOUNDS, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_MIN_COHORT_SIZE,
    DEFAULT_UNIT_BUCKET_BOUNDS, MAX_CACHE_ENTRIES_HARD, MAX_MIN_COHORT_SIZE,
    MIN_METRIC_SAMPLE_FLOOR,
};
pub use schema::{
    BenchmarkPolicy, CachePolicy, CohortPolicy, ConfidencePolicy, PolicySchemaVersion,
};
pub use validate::{
    canonical_config_json, load_policy_from_path, policy_hash, resolve_policy,
    validate_policy_config, PolicySource, PolicyValidationError,
};

pub const CRATE_NAME: &str = "peerbench-policies";
