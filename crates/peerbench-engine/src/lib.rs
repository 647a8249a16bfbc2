// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Peer benchmarking engine.
//!
//! A request flows cache → metric extraction → cohort selection → percentile
//! ranking → confidence scoring → cache. Every stage below the cache is a pure
//! function of one [`PopulationSnapshot`], so results for the same
//! `(building, dataset version)` are identical no matter which thread computes
//! them.

mod cache;
mod cohort;
mod confidence;
mod engine;
mod error;
mod extract;
mod percentile;
mod population;

pub use cache::{BenchmarkCache, CacheKey, CacheStats, MemoryBenchmarkCache, NoopBenchmarkCache};
pub use cohort::{initial_criteria, select_cohort};
pub use confidence::{score_confidence, ConfidenceInput};
pub use engine::{compute_benchmark, BenchmarkEngine};
pub use error::{BenchmarkError, BenchmarkErrorCode};
pub use extract::{extract_metrics, MetricExtraction};
pub use percentile::{peer_median, percentile_rank};
pub use population::{InMemoryPopulation, PopulationSnapshot, PopulationSource};

pub const CRATE_NAME: &str = "peerbench-engine";
