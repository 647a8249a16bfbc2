// SPDX-License-Identifier: Apache-2.0

use crate::output::{emit_ok, render_benchmark, render_cohort};
use crate::{CliError, OutputMode, PopulationArgs};
use peerbench_core::{ExitCode, MachineError};
use peerbench_engine::{BenchmarkEngine, InMemoryPopulation, PopulationSnapshot};
use peerbench_model::{BuildingId, BuildingRecord, RawBuildingRecord};
use peerbench_policies::{
    canonical_config_json, load_policy_from_path, policy_hash, resolve_policy, BenchmarkPolicy,
    PolicySource,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub(crate) fn run_benchmark(
    input: &PopulationArgs,
    building: &str,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let id = parse_building(building)?;
    let engine = build_engine(input)?;
    let result = engine.benchmark(&id)?;
    if output_mode.json {
        emit_ok(
            output_mode,
            json!({
                "command": "benchmark",
                "policy_hash": policy_hash(engine.policy()).map_err(|e| CliError::internal(e.0))?,
                "result": to_value(result.as_ref())?,
            }),
        )
    } else {
        println!("{}", render_benchmark(&result));
        Ok(())
    }
}

pub(crate) fn run_cohort(
    input: &PopulationArgs,
    building: &str,
    output_mode: OutputMode,
) -> Result<(), CliError> {
    let id = parse_building(building)?;
    let engine = build_engine(input)?;
    let cohort = engine.explain_cohort(&id)?;
    if output_mode.json {
        emit_ok(
            output_mode,
            json!({
                "command": "cohort",
                "dataset_version": engine.current_version()?.as_str(),
                "cohort": to_value(&cohort)?,
            }),
        )
    } else {
        println!("{}", render_cohort(&cohort));
        Ok(())
    }
}

pub(crate) fn run_fingerprint(input: &PopulationArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let snapshot = PopulationSnapshot::from_records(load_population(input)?)?;
    emit_ok(
        output_mode,
        json!({
            "command": "fingerprint",
            "dataset_version": snapshot.version().as_str(),
            "records": snapshot.len(),
        }),
    )
}

pub(crate) fn run_policy_validate(path: &Path, output_mode: OutputMode) -> Result<(), CliError> {
    let policy = load_policy_from_path(path).map_err(|e| CliError::validation(e.0))?;
    emit_ok(
        output_mode,
        json!({
            "command": "policy validate",
            "status": "ok",
            "path": path.display().to_string(),
            "policy_hash": policy_hash(&policy).map_err(|e| CliError::internal(e.0))?,
        }),
    )
}

pub(crate) fn run_policy_print_default(output_mode: OutputMode) -> Result<(), CliError> {
    let policy = BenchmarkPolicy::default();
    if output_mode.json {
        let text = canonical_config_json(&policy).map_err(|e| CliError::internal(e.0))?;
        println!("{text}");
        Ok(())
    } else {
        emit_ok(output_mode, to_value(&policy)?)
    }
}

pub(crate) fn run_policy_show(explicit: Option<&Path>, output_mode: OutputMode) -> Result<(), CliError> {
    let (policy, source) = resolve_policy(explicit).map_err(|e| CliError::validation(e.0))?;
    let (kind, path) = match &source {
        PolicySource::Explicit(p) => ("explicit", Some(p.display().to_string())),
        PolicySource::Environment(p) => ("environment", Some(p.display().to_string())),
        PolicySource::Workspace(p) => ("workspace", Some(p.display().to_string())),
        PolicySource::Defaults => ("defaults", None),
    };
    emit_ok(
        output_mode,
        json!({
            "command": "policy show",
            "source": kind,
            "path": path,
            "policy_hash": policy_hash(&policy).map_err(|e| CliError::internal(e.0))?,
            "policy": to_value(&policy)?,
        }),
    )
}

fn build_engine(input: &PopulationArgs) -> Result<BenchmarkEngine, CliError> {
    let (policy, source) =
        resolve_policy(input.policy.as_deref()).map_err(|e| CliError::validation(e.0))?;
    debug!(source = ?source, "policy resolved");
    let population = Arc::new(InMemoryPopulation::from_records(load_population(input)?)?);
    BenchmarkEngine::new(population, policy).map_err(|e| CliError::validation(e.0))
}

fn load_population(input: &PopulationArgs) -> Result<Vec<BuildingRecord>, CliError> {
    let path = &input.population;
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::dependency(format!("failed to read population {}: {e}", path.display()))
    })?;
    let raw: Vec<RawBuildingRecord> = serde_json::from_str(&text).map_err(|e| {
        CliError::validation(format!("failed to parse population {}: {e}", path.display()))
    })?;

    let mut records = Vec::with_capacity(raw.len());
    for (index, entry) in raw.iter().enumerate() {
        match BuildingRecord::from_raw(entry) {
            Ok(record) => records.push(record),
            Err(err) if input.skip_invalid => {
                warn!(index, id = %entry.id, error = %err, "skipping invalid building record");
            }
            Err(err) => {
                return Err(CliError {
                    exit_code: ExitCode::Validation,
                    machine: MachineError::new(
                        "validation_error",
                        &format!("record {index} is invalid: {err}"),
                    )
                    .with_detail("index", &index.to_string())
                    .with_detail("id", &entry.id),
                });
            }
        }
    }
    info!(records = records.len(), skipped = raw.len() - records.len(), "population loaded");
    Ok(records)
}

fn parse_building(raw: &str) -> Result<BuildingId, CliError> {
    BuildingId::parse(raw).map_err(|e| CliError::usage(format!("invalid --building: {e}")))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::internal(e.to_string()))
}
