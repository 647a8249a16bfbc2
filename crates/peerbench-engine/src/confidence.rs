// SPDX-License-Identifier: Apache-2.0

use peerbench_model::ConfidenceTier;
use peerbench_policies::{BenchmarkPolicy, MIN_METRIC_SAMPLE_FLOOR};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInput {
    /// Cohort members holding the metric.
    pub sample_size: usize,
    pub cohort_size: usize,
    pub widening_level: usize,
    /// `sample_size / cohort size`, in `[0, 1]`.
    pub completeness: f64,
}

impl ConfidenceInput {
    #[must_use]
    pub fn new(sample_size: usize, cohort_size: usize, widening_level: usize) -> Self {
        let completeness = if cohort_size == 0 {
            0.0
        } else {
            (sample_size as f64 / cohort_size as f64).min(1.0)
        };
        Self {
            sample_size,
            cohort_size,
            widening_level,
            completeness,
        }
    }
}

/// Maps cohort size, sample size, widening and completeness onto a tier using
/// the thresholds documented on `ConfidencePolicy`. A sample below two values
/// is insufficient whatever the policy says.
#[must_use]
pub fn score_confidence(input: &ConfidenceInput, policy: &BenchmarkPolicy) -> ConfidenceTier {
    let c = &policy.confidence;
    let min_cohort = policy.cohort.min_cohort_size;
    let completeness = if input.completeness.is_nan() {
        0.0
    } else {
        input.completeness
    };

    if input.sample_size < c.min_metric_sample.max(MIN_METRIC_SAMPLE_FLOOR) {
        return ConfidenceTier::Insufficient;
    }
    if input.cohort_size >= c.high_size_multiplier.saturating_mul(min_cohort)
        && input.widening_level <= c.high_max_widening
        && completeness >= c.high_min_completeness
    {
        return ConfidenceTier::High;
    }
    if input.sample_size >= min_cohort
        && input.widening_level <= c.medium_max_widening
        && completeness >= c.medium_min_completeness
    {
        return ConfidenceTier::Medium;
    }
    ConfidenceTier::Low
}
