// SPDX-License-Identifier: Apache-2.0

use crate::{BuildingRecord, ValidationError};
use peerbench_core::canonical;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const DATASET_VERSION_MAX_LEN: usize = 128;

/// Opaque token naming one consistent snapshot of the building population.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetVersion(String);

impl DatasetVersion {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("dataset version must not be empty".to_string()));
        }
        if s.len() > DATASET_VERSION_MAX_LEN {
            return Err(ValidationError(format!(
                "dataset version exceeds max length {DATASET_VERSION_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError(
                "dataset version must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Content fingerprint of a population: sha256 over one canonical JSON
    /// line per record, records ordered by id. Input order does not matter.
    pub fn fingerprint(records: &[BuildingRecord]) -> Result<Self, ValidationError> {
        let mut ordered: Vec<&BuildingRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));
        let hash = canonical::canonical_sha256_lines(ordered.iter().copied())
            .map_err(|e| ValidationError(format!("population fingerprint failed: {e}")))?;
        Ok(Self(format!("sha256:{hash}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters of the hash part, for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        let body = self.0.strip_prefix("sha256:").unwrap_or(&self.0);
        let end = body
            .char_indices()
            .nth(12)
            .map_or(body.len(), |(idx, _)| idx);
        &body[..end]
    }
}

impl TryFrom<String> for DatasetVersion {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DatasetVersion> for String {
    fn from(value: DatasetVersion) -> Self {
        value.0
    }
}

impl Display for DatasetVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
