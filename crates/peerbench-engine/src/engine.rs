// SPDX-License-Identifier: Apache-2.0

use crate::cache::{BenchmarkCache, CacheKey, CacheStats, MemoryBenchmarkCache, NoopBenchmarkCache};
use crate::cohort::select_cohort;
use crate::confidence::{score_confidence, ConfidenceInput};
use crate::error::BenchmarkError;
use crate::extract::extract_metrics;
use crate::percentile::{peer_median, percentile_rank};
use crate::population::{PopulationSnapshot, PopulationSource};
use peerbench_model::{
    BenchmarkResult, BuildingId, CohortSummary, ConfidenceTier, DatasetVersion, MetricBenchmark,
    MetricVector, PeerCohort, SkipReason, SkippedMetric,
};
use peerbench_policies::{validate_policy_config, BenchmarkPolicy, PolicyValidationError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn};

/// Benchmarks one building against one snapshot. Pure: the same snapshot,
/// id and policy always produce the same result.
pub fn compute_benchmark(
    snapshot: &PopulationSnapshot,
    building_id: &BuildingId,
    policy: &BenchmarkPolicy,
) -> Result<BenchmarkResult, BenchmarkError> {
    let target = snapshot
        .get(building_id)
        .ok_or_else(|| BenchmarkError::UnknownBuilding {
            building_id: building_id.clone(),
            version: snapshot.version().clone(),
        })?;
    let extraction = extract_metrics(target);
    if !extraction.is_benchmarkable() {
        return Err(BenchmarkError::NotBenchmarkable {
            building_id: building_id.clone(),
        });
    }

    let cohort = select_cohort(target, snapshot.records(), &policy.cohort);
    if !cohort.is_sufficient() {
        return Err(BenchmarkError::InsufficientCohort {
            building_id: building_id.clone(),
            cohort_size: cohort.size(),
            required: cohort.min_size,
            widening_level: cohort.widening_level,
        });
    }

    let peers: Vec<MetricVector> = cohort
        .members
        .iter()
        .filter_map(|id| snapshot.get(id))
        .map(|record| extract_metrics(record).metrics)
        .collect();

    let mut skipped: Vec<SkippedMetric> = extraction
        .missing
        .iter()
        .map(|metric| SkippedMetric {
            metric: *metric,
            reason: SkipReason::MissingOnTarget,
        })
        .collect();
    let mut metrics = BTreeMap::new();
    for (metric, value) in extraction.metrics.iter() {
        let values: Vec<f64> = peers.iter().filter_map(|peer| peer.get(metric)).collect();
        let (Some(rank), Some(median)) = (percentile_rank(value, &values), peer_median(&values))
        else {
            skipped.push(SkippedMetric {
                metric,
                reason: SkipReason::NoPeerValues,
            });
            continue;
        };
        let input = ConfidenceInput::new(values.len(), cohort.size(), cohort.widening_level);
        metrics.insert(
            metric,
            MetricBenchmark {
                value,
                percentile_rank: rank,
                cohort_size: values.len(),
                completeness: input.completeness,
                peer_median: median,
                polarity: metric.polarity(),
                confidence: score_confidence(&input, policy),
            },
        );
    }
    skipped.sort_by_key(|s| s.metric);

    let overall_confidence = ConfidenceTier::weakest(metrics.values().map(|m| m.confidence))
        .unwrap_or(ConfidenceTier::Insufficient);
    Ok(BenchmarkResult {
        building_id: building_id.clone(),
        dataset_version: snapshot.version().clone(),
        cohort: CohortSummary {
            size: cohort.size(),
            widening_level: cohort.widening_level,
            criteria: cohort.criteria,
        },
        metrics,
        skipped,
        overall_confidence,
    })
}

/// Thread-safe front door: reads the population through a
/// [`PopulationSource`] and memoizes results per dataset version.
pub struct BenchmarkEngine {
    source: Arc<dyn PopulationSource>,
    cache: Arc<dyn BenchmarkCache>,
    policy: Arc<BenchmarkPolicy>,
}

impl BenchmarkEngine {
    pub fn new(
        source: Arc<dyn PopulationSource>,
        policy: BenchmarkPolicy,
    ) -> Result<Self, PolicyValidationError> {
        validate_policy_config(&policy)?;
        let cache: Arc<dyn BenchmarkCache> = if policy.cache.enabled {
            Arc::new(MemoryBenchmarkCache::new(policy.cache.max_entries))
        } else {
            Arc::new(NoopBenchmarkCache)
        };
        Ok(Self {
            source,
            cache,
            policy: Arc::new(policy),
        })
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn BenchmarkCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &BenchmarkPolicy {
        &self.policy
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn current_version(&self) -> Result<DatasetVersion, BenchmarkError> {
        self.source.current_version()
    }

    /// Benchmarks against the current dataset version.
    pub fn benchmark(&self, building_id: &BuildingId) -> Result<Arc<BenchmarkResult>, BenchmarkError> {
        let snapshot = self.source.current()?;
        self.serve(building_id, snapshot)
    }

    /// Benchmarks against a specific version. Only the current version is
    /// cached; a version the source no longer holds is `StaleVersionRequested`.
    pub fn benchmark_at(
        &self,
        building_id: &BuildingId,
        version: &DatasetVersion,
    ) -> Result<Arc<BenchmarkResult>, BenchmarkError> {
        let snapshot = self.source.population(version).inspect_err(|err| {
            if let BenchmarkError::StaleVersionRequested { requested, current } = err {
                warn!(
                    building_id = %building_id,
                    requested = %requested,
                    current = %current,
                    "stale dataset version requested"
                );
            }
        })?;
        self.serve(building_id, snapshot)
    }

    /// Drops every cached result of `version`. Returns the number dropped.
    pub fn invalidate(&self, version: &DatasetVersion) -> usize {
        let dropped = self.cache.invalidate(version);
        info!(version = %version.short(), dropped, "benchmark cache invalidated");
        dropped
    }

    /// Cohort the current version would use for `building_id`, including
    /// insufficient ones.
    pub fn explain_cohort(&self, building_id: &BuildingId) -> Result<PeerCohort, BenchmarkError> {
        let snapshot = self.source.current()?;
        let target = snapshot
            .get(building_id)
            .ok_or_else(|| BenchmarkError::UnknownBuilding {
                building_id: building_id.clone(),
                version: snapshot.version().clone(),
            })?;
        Ok(select_cohort(target, snapshot.records(), &self.policy.cohort))
    }

    fn serve(
        &self,
        building_id: &BuildingId,
        snapshot: Arc<PopulationSnapshot>,
    ) -> Result<Arc<BenchmarkResult>, BenchmarkError> {
        let version = snapshot.version();
        let span = debug_span!(
            "benchmark",
            building_id = %building_id,
            version = %version.short()
        );
        let _guard = span.enter();

        let current = self.source.current_version()?;
        self.cache.observe_version(&current);
        let cacheable = *version == current;
        let key = CacheKey::new(building_id.clone(), version.clone());
        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                debug!("cache hit");
                return Ok(hit);
            }
        }

        let result = Arc::new(compute_benchmark(&snapshot, building_id, &self.policy)?);
        debug!(
            cohort_size = result.cohort.size,
            widening_level = result.cohort.widening_level,
            confidence = %result.overall_confidence,
            "benchmark computed"
        );
        if cacheable {
            Ok(self.cache.insert_if_absent(key, result))
        } else {
            Ok(result)
        }
    }
}
