// SPDX-License-Identifier: Apache-2.0

use crate::limits::{MAX_CACHE_ENTRIES_HARD, MAX_MIN_COHORT_SIZE, MIN_METRIC_SAMPLE_FLOOR};
use crate::schema::{BenchmarkPolicy, CohortPolicy, ConfidencePolicy};
use peerbench_core::{canonical, resolve_policy_path, ConfigPathScope, ENV_PEERBENCH_POLICY_PATH};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PolicyValidationError(pub String);

/// Where the effective policy came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    Explicit(PathBuf),
    Environment(PathBuf),
    Workspace(PathBuf),
    Defaults,
}

pub fn load_policy_from_path(path: &Path) -> Result<BenchmarkPolicy, PolicyValidationError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PolicyValidationError(format!("failed to read policy {}: {e}", path.display()))
    })?;
    let policy: BenchmarkPolicy = serde_json::from_str(&text).map_err(|e| {
        PolicyValidationError(format!("failed to parse policy {}: {e}", path.display()))
    })?;
    validate_policy_config(&policy)?;
    Ok(policy)
}

/// Explicit path, then `PEERBENCH_POLICY_PATH`, then the workspace policy file
/// if it exists, then built-in defaults.
pub fn resolve_policy(
    explicit: Option<&Path>,
) -> Result<(BenchmarkPolicy, PolicySource), PolicyValidationError> {
    if let Some(path) = explicit {
        return Ok((
            load_policy_from_path(path)?,
            PolicySource::Explicit(path.to_path_buf()),
        ));
    }
    if std::env::var(ENV_PEERBENCH_POLICY_PATH).is_ok_and(|v| !v.trim().is_empty()) {
        let path = resolve_policy_path(ConfigPathScope::User);
        return Ok((load_policy_from_path(&path)?, PolicySource::Environment(path)));
    }
    let workspace = resolve_policy_path(ConfigPathScope::Workspace);
    if workspace.is_file() {
        return Ok((
            load_policy_from_path(&workspace)?,
            PolicySource::Workspace(workspace),
        ));
    }
    Ok((BenchmarkPolicy::default(), PolicySource::Defaults))
}

pub fn validate_policy_config(policy: &BenchmarkPolicy) -> Result<(), PolicyValidationError> {
    validate_cohort(&policy.cohort)?;
    validate_confidence(&policy.confidence)?;
    if policy.cache.enabled
        && (policy.cache.max_entries == 0 || policy.cache.max_entries > MAX_CACHE_ENTRIES_HARD)
    {
        return Err(PolicyValidationError(format!(
            "cache.max_entries must be between 1 and {MAX_CACHE_ENTRIES_HARD}"
        )));
    }
    Ok(())
}

fn validate_cohort(cohort: &CohortPolicy) -> Result<(), PolicyValidationError> {
    if cohort.min_cohort_size == 0 || cohort.min_cohort_size > MAX_MIN_COHORT_SIZE {
        return Err(PolicyValidationError(format!(
            "cohort.min_cohort_size must be between 1 and {MAX_MIN_COHORT_SIZE}"
        )));
    }
    let mut seen = BTreeSet::new();
    for tier in &cohort.relaxation_order {
        if tier.is_empty() {
            return Err(PolicyValidationError(
                "cohort.relaxation_order must not contain empty tiers".to_string(),
            ));
        }
        for dimension in tier {
            if !seen.insert(*dimension) {
                return Err(PolicyValidationError(format!(
                    "cohort.relaxation_order lists `{dimension}` more than once"
                )));
            }
        }
    }
    if cohort.max_widening_steps > cohort.relaxable_dimensions() {
        return Err(PolicyValidationError(format!(
            "cohort.max_widening_steps {} exceeds the {} relaxable dimensions",
            cohort.max_widening_steps,
            cohort.relaxable_dimensions()
        )));
    }
    validate_bounds("cohort.unit_bucket_bounds", &cohort.unit_bucket_bounds)?;
    validate_bounds("cohort.age_bucket_bounds", &cohort.age_bucket_bounds)?;
    Ok(())
}

fn validate_bounds(field: &str, bounds: &[u32]) -> Result<(), PolicyValidationError> {
    if bounds.first() == Some(&0) {
        return Err(PolicyValidationError(format!("{field} must be > 0")));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(PolicyValidationError(format!(
            "{field} must be strictly ascending"
        )));
    }
    Ok(())
}

fn validate_confidence(confidence: &ConfidencePolicy) -> Result<(), PolicyValidationError> {
    if confidence.min_metric_sample < MIN_METRIC_SAMPLE_FLOOR {
        return Err(PolicyValidationError(format!(
            "confidence.min_metric_sample must be >= {MIN_METRIC_SAMPLE_FLOOR}"
        )));
    }
    if confidence.high_size_multiplier == 0 {
        return Err(PolicyValidationError(
            "confidence.high_size_multiplier must be > 0".to_string(),
        ));
    }
    if confidence.high_max_widening > confidence.medium_max_widening {
        return Err(PolicyValidationError(
            "confidence.high_max_widening must be <= medium_max_widening".to_string(),
        ));
    }
    for (field, value) in [
        ("high_min_completeness", confidence.high_min_completeness),
        ("medium_min_completeness", confidence.medium_min_completeness),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(PolicyValidationError(format!(
                "confidence.{field} must be within [0, 1]"
            )));
        }
    }
    if confidence.high_min_completeness < confidence.medium_min_completeness {
        return Err(PolicyValidationError(
            "confidence.high_min_completeness must be >= medium_min_completeness".to_string(),
        ));
    }
    Ok(())
}

pub fn canonical_config_json(policy: &BenchmarkPolicy) -> Result<String, PolicyValidationError> {
    let bytes = canonical::canonical_bytes(policy)
        .map_err(|e| PolicyValidationError(format!("policy encode failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| PolicyValidationError(e.to_string()))
}

pub fn policy_hash(policy: &BenchmarkPolicy) -> Result<String, PolicyValidationError> {
    canonical::canonical_sha256(policy)
        .map_err(|e| PolicyValidationError(format!("policy hash failed: {e}")))
}
