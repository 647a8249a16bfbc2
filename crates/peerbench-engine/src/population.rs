// SPDX-License-Identifier: Apache-2.0

use crate::error::BenchmarkError;
use parking_lot::RwLock;
use peerbench_model::{BuildingId, BuildingRecord, DatasetVersion};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One immutable, versioned view of the building population.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSnapshot {
    version: DatasetVersion,
    records: BTreeMap<BuildingId, BuildingRecord>,
}

impl PopulationSnapshot {
    /// Snapshot whose version is the content fingerprint of `records`.
    pub fn from_records(records: Vec<BuildingRecord>) -> Result<Self, BenchmarkError> {
        let version = DatasetVersion::fingerprint(&records)
            .map_err(|e| BenchmarkError::Population(e.to_string()))?;
        Self::with_version(version, records)
    }

    pub fn with_version(
        version: DatasetVersion,
        records: Vec<BuildingRecord>,
    ) -> Result<Self, BenchmarkError> {
        let mut by_id = BTreeMap::new();
        for record in records {
            let id = record.id.clone();
            if by_id.insert(id.clone(), record).is_some() {
                return Err(BenchmarkError::Population(format!(
                    "duplicate building id `{id}`"
                )));
            }
        }
        Ok(Self {
            version,
            records: by_id,
        })
    }

    #[must_use]
    pub fn version(&self) -> &DatasetVersion {
        &self.version
    }

    #[must_use]
    pub fn get(&self, id: &BuildingId) -> Option<&BuildingRecord> {
        self.records.get(id)
    }

    /// Records in building id order.
    pub fn records(&self) -> impl Iterator<Item = &BuildingRecord> + '_ {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only port onto the building population owned elsewhere.
pub trait PopulationSource: Send + Sync {
    fn current_version(&self) -> Result<DatasetVersion, BenchmarkError>;

    /// Snapshot for `version`, or `StaleVersionRequested` once it is gone.
    fn population(&self, version: &DatasetVersion)
        -> Result<Arc<PopulationSnapshot>, BenchmarkError>;

    /// Current snapshot. Sources that can swap versions concurrently should
    /// override this so version and records are read together.
    fn current(&self) -> Result<Arc<PopulationSnapshot>, BenchmarkError> {
        self.population(&self.current_version()?)
    }

    fn building(
        &self,
        id: &BuildingId,
        version: &DatasetVersion,
    ) -> Result<BuildingRecord, BenchmarkError> {
        self.population(version)?
            .get(id)
            .cloned()
            .ok_or_else(|| BenchmarkError::UnknownBuilding {
                building_id: id.clone(),
                version: version.clone(),
            })
    }
}

/// Holds only the current snapshot; earlier versions become stale the moment
/// a new one is published.
#[derive(Debug)]
pub struct InMemoryPopulation {
    current: RwLock<Arc<PopulationSnapshot>>,
}

impl InMemoryPopulation {
    #[must_use]
    pub fn new(snapshot: PopulationSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn from_records(records: Vec<BuildingRecord>) -> Result<Self, BenchmarkError> {
        Ok(Self::new(PopulationSnapshot::from_records(records)?))
    }

    /// Publishes `records` as a new fingerprinted version and returns it.
    pub fn replace(&self, records: Vec<BuildingRecord>) -> Result<DatasetVersion, BenchmarkError> {
        let snapshot = PopulationSnapshot::from_records(records)?;
        Ok(self.publish(snapshot))
    }

    pub fn publish(&self, snapshot: PopulationSnapshot) -> DatasetVersion {
        let version = snapshot.version().clone();
        *self.current.write() = Arc::new(snapshot);
        version
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<PopulationSnapshot> {
        Arc::clone(&self.current.read())
    }
}

impl PopulationSource for InMemoryPopulation {
    fn current_version(&self) -> Result<DatasetVersion, BenchmarkError> {
        Ok(self.current.read().version().clone())
    }

    fn population(
        &self,
        version: &DatasetVersion,
    ) -> Result<Arc<PopulationSnapshot>, BenchmarkError> {
        let current = self.snapshot();
        if current.version() == version {
            Ok(current)
        } else {
            Err(BenchmarkError::StaleVersionRequested {
                requested: version.clone(),
                current: current.version().clone(),
            })
        }
    }

    fn current(&self) -> Result<Arc<PopulationSnapshot>, BenchmarkError> {
        Ok(self.snapshot())
    }
}
