// SPDX-License-Identifier: Apache-2.0

use crate::{CliError, OutputMode};
use peerbench_core::canonical;
use peerbench_model::{
    BenchmarkResult, CohortStatus, PeerCohort, SimilarityCriteria, SkipReason,
};
use serde_json::Value;
use std::fmt::Write as _;

pub(crate) fn emit_ok(output_mode: OutputMode, payload: Value) -> Result<(), CliError> {
    if output_mode.json {
        let bytes =
            canonical::canonical_bytes(&payload).map_err(|e| CliError::internal(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| CliError::internal(e.to_string()))?;
        println!("{text}");
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| CliError::internal(e.to_string()))?
        );
    }
    Ok(())
}

pub(crate) fn render_benchmark(result: &BenchmarkResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "building {}  dataset {}",
        result.building_id,
        result.dataset_version.short()
    );
    let _ = writeln!(
        out,
        "cohort {} peers, widening {}, confidence {}",
        result.cohort.size, result.cohort.widening_level, result.overall_confidence
    );
    let _ = writeln!(out, "criteria {}", describe_criteria(&result.cohort.criteria));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<26} {:>14} {:>10} {:>12} {:>6}  confidence",
        "metric", "value", "rank", "better than", "peers"
    );
    for (metric, bench) in &result.metrics {
        let _ = writeln!(
            out,
            "{:<26} {:>14.2} {:>10.1} {:>11.1}% {:>6}  {}",
            metric.as_str(),
            bench.value,
            bench.percentile_rank,
            bench.better_than_pct(),
            bench.cohort_size,
            bench.confidence
        );
    }
    if !result.skipped.is_empty() {
        let skipped: Vec<String> = result
            .skipped
            .iter()
            .map(|s| format!("{} ({})", s.metric.as_str(), skip_reason(s.reason)))
            .collect();
        let _ = writeln!(out);
        let _ = write!(out, "skipped {}", skipped.join(", "));
    }
    out.trim_end().to_string()
}

pub(crate) fn render_cohort(cohort: &PeerCohort) -> String {
    let mut out = String::new();
    let status = match cohort.status {
        CohortStatus::Sufficient => "sufficient",
        CohortStatus::Insufficient => "insufficient",
    };
    let _ = writeln!(
        out,
        "cohort for {}: {} peers (min {}), {status}, widening {}",
        cohort.target,
        cohort.size(),
        cohort.min_size,
        cohort.widening_level
    );
    let _ = writeln!(out, "initial  {}", describe_criteria(&cohort.initial_criteria));
    let _ = writeln!(out, "final    {}", describe_criteria(&cohort.criteria));
    for (idx, step) in cohort.steps.iter().enumerate() {
        let _ = writeln!(
            out,
            "step {}: relaxed {} (was excluding {}) -> {} peers",
            idx + 1,
            step.relaxed,
            step.exclusions,
            step.cohort_size
        );
    }
    let members: Vec<&str> = cohort.members.iter().map(|id| id.as_str()).collect();
    let _ = write!(out, "members {}", members.join(", "));
    out
}

fn describe_criteria(criteria: &SimilarityCriteria) -> String {
    let mut parts = Vec::new();
    if let Some(range) = &criteria.unit_bucket {
        parts.push(format!("units={range}"));
    }
    if let Some(neighborhood) = &criteria.neighborhood {
        parts.push(format!("neighborhood={neighborhood}"));
    }
    if let Some(borough) = &criteria.borough {
        parts.push(format!("borough={borough}"));
    }
    if let Some(kind) = &criteria.building_type {
        parts.push(format!("type={kind}"));
    }
    if let Some(range) = &criteria.age_bucket {
        parts.push(format!("built={range}"));
    }
    if parts.is_empty() {
        "unconstrained".to_string()
    } else {
        parts.join(" ")
    }
}

fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::MissingOnTarget => "missing on building",
        SkipReason::NoPeerValues => "no peer values",
    }
}
