// SPDX-License-Identifier: Apache-2.0

use parking_lot::RwLock;
use peerbench_model::{BenchmarkResult, BuildingId, DatasetVersion};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub building_id: BuildingId,
    pub version: DatasetVersion,
}

impl CacheKey {
    #[must_use]
    pub fn new(building_id: BuildingId, version: DatasetVersion) -> Self {
        Self {
            building_id,
            version,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub current_version: Option<String>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Entries dropped because their version was retired or superseded.
    pub discarded: u64,
}

/// Result cache keyed by `(building, dataset version)`.
///
/// Implementations only ever serve entries of the version last passed to
/// [`BenchmarkCache::observe_version`].
pub trait BenchmarkCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<BenchmarkResult>>;

    /// Stores `result` unless an entry already exists, and returns whichever
    /// entry callers should use. Results for a non-current version are
    /// returned without being stored.
    fn insert_if_absent(&self, key: CacheKey, result: Arc<BenchmarkResult>)
        -> Arc<BenchmarkResult>;

    fn observe_version(&self, version: &DatasetVersion);

    /// Drops every entry of `version`; returns how many were dropped.
    fn invalidate(&self, version: &DatasetVersion) -> usize;

    fn stats(&self) -> CacheStats;
}

struct CacheState {
    current: Option<DatasetVersion>,
    entries: HashMap<CacheKey, (Arc<BenchmarkResult>, u64)>,
    next_seq: u64,
}

/// Bounded in-memory cache. When full it first discards entries of
/// superseded versions, then evicts the oldest insertion.
pub struct MemoryBenchmarkCache {
    max_entries: usize,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    discarded: AtomicU64,
}

impl MemoryBenchmarkCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            state: RwLock::new(CacheState {
                current: None,
                entries: HashMap::new(),
                next_seq: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BenchmarkCache for MemoryBenchmarkCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<BenchmarkResult>> {
        let state = self.state.read();
        let found = if state.current.as_ref() == Some(&key.version) {
            state.entries.get(key).map(|(result, _)| Arc::clone(result))
        } else {
            None
        };
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn insert_if_absent(
        &self,
        key: CacheKey,
        result: Arc<BenchmarkResult>,
    ) -> Arc<BenchmarkResult> {
        let mut state = self.state.write();
        if state.current.as_ref() != Some(&key.version) {
            return result;
        }
        if let Some((existing, _)) = state.entries.get(&key) {
            return Arc::clone(existing);
        }
        if state.entries.len() >= self.max_entries {
            let before = state.entries.len();
            let current = state.current.clone();
            state
                .entries
                .retain(|k, _| current.as_ref() == Some(&k.version));
            let dropped = before - state.entries.len();
            self.discarded.fetch_add(dropped as u64, Ordering::Relaxed);
        }
        if state.entries.len() >= self.max_entries {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, (_, seq))| *seq)
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                state.entries.remove(&victim);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(key, (Arc::clone(&result), seq));
        result
    }

    fn observe_version(&self, version: &DatasetVersion) {
        if self.state.read().current.as_ref() == Some(version) {
            return;
        }
        self.state.write().current = Some(version.clone());
    }

    fn invalidate(&self, version: &DatasetVersion) -> usize {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|k, _| &k.version != version);
        if state.current.as_ref() == Some(version) {
            state.current = None;
        }
        let dropped = before - state.entries.len();
        self.discarded.fetch_add(dropped as u64, Ordering::Relaxed);
        dropped
    }

    fn stats(&self) -> CacheStats {
        let state = self.state.read();
        CacheStats {
            entries: state.entries.len(),
            current_version: state.current.as_ref().map(|v| v.as_str().to_string()),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Stores nothing; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBenchmarkCache;

impl BenchmarkCache for NoopBenchmarkCache {
    fn get(&self, _key: &CacheKey) -> Option<Arc<BenchmarkResult>> {
        None
    }

    fn insert_if_absent(
        &self,
        _key: CacheKey,
        result: Arc<BenchmarkResult>,
    ) -> Arc<BenchmarkResult> {
        result
    }

    fn observe_version(&self, _version: &DatasetVersion) {}

    fn invalidate(&self, _version: &DatasetVersion) -> usize {
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}
