// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::loose_number;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const BUILDING_ID_MAX_LEN: usize = 32;
pub const BUILDING_TYPE_MAX_LEN: usize = 48;
pub const NEIGHBORHOOD_MAX_LEN: usize = 64;

const YEAR_BUILT_MIN: f64 = 1600.0;
const YEAR_BUILT_MAX: f64 = 2100.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildingId(String);

impl BuildingId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("building id must not be empty".to_string()));
        }
        if s.len() > BUILDING_ID_MAX_LEN {
            return Err(ValidationError(format!(
                "building id exceeds max length {BUILDING_ID_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError(format!(
                "building id `{s}` must match [A-Za-z0-9_-]+"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BuildingId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildingId> for String {
    fn from(value: BuildingId) -> Self {
        value.0
    }
}

impl Display for BuildingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Borough {
    Manhattan,
    Bronx,
    Brooklyn,
    Queens,
    StatenIsland,
}

impl Borough {
    pub const ALL: [Self; 5] = [
        Self::Manhattan,
        Self::Bronx,
        Self::Brooklyn,
        Self::Queens,
        Self::StatenIsland,
    ];

    /// Accepts borough names and the DOF/DOB borough codes (`MN`, `1`, ...).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "manhattan" | "mn" | "1" | "new_york" => Ok(Self::Manhattan),
            "bronx" | "the_bronx" | "bx" | "2" => Ok(Self::Bronx),
            "brooklyn" | "bk" | "3" | "kings" => Ok(Self::Brooklyn),
            "queens" | "qn" | "4" => Ok(Self::Queens),
            "staten_island" | "si" | "5" | "richmond" => Ok(Self::StatenIsland),
            _ => Err(ValidationError(format!("unknown borough `{}`", input.trim()))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manhattan => "manhattan",
            Self::Bronx => "bronx",
            Self::Brooklyn => "brooklyn",
            Self::Queens => "queens",
            Self::StatenIsland => "staten_island",
        }
    }
}

impl Display for Borough {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized building class token, e.g. `elevator`, `walk_up`, `condo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuildingType(String);

impl BuildingType {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        if normalized.is_empty() {
            return Err(ValidationError("building type must not be empty".to_string()));
        }
        if normalized.len() > BUILDING_TYPE_MAX_LEN {
            return Err(ValidationError(format!(
                "building type exceeds max length {BUILDING_TYPE_MAX_LEN}"
            )));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ValidationError(format!(
                "building type `{}` must match [a-z0-9_]+ after normalization",
                input.trim()
            )));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BuildingType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuildingType> for String {
    fn from(value: BuildingType) -> Self {
        value.0
    }
}

impl Display for BuildingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_neighborhood(input: &str) -> Result<Option<String>, ValidationError> {
    let collapsed = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if collapsed.is_empty() {
        return Ok(None);
    }
    if collapsed.len() > NEIGHBORHOOD_MAX_LEN {
        return Err(ValidationError(format!(
            "neighborhood exceeds max length {NEIGHBORHOOD_MAX_LEN}"
        )));
    }
    Ok(Some(collapsed))
}

/// Building record exactly as the upstream data layer hands it over.
///
/// Numbers may be JSON numbers, numeric strings, `null`, or absent; `0` means
/// "not yet populated". Unknown upstream keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBuildingRecord {
    pub id: String,
    #[serde(default)]
    pub borough: Option<String>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default, with = "loose_number")]
    pub unit_count: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub floor_count: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub year_built: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub assessed_value: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub annual_tax_estimate: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub tax_trend_pct: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub open_violations: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub avg_days_to_close: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub ll97_penalty_estimate: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub facade_cost_estimate: Option<f64>,
    #[serde(default, with = "loose_number")]
    pub compliance_cost_estimate: Option<f64>,
}

/// Immutable building snapshot read by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct BuildingRecord {
    pub id: BuildingId,
    pub borough: Borough,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<BuildingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessed_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_tax_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_trend_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_violations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_days_to_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ll97_penalty_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facade_cost_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_cost_estimate: Option<f64>,
}

impl BuildingRecord {
    #[must_use]
    pub fn new(id: BuildingId, borough: Borough) -> Self {
        Self {
            id,
            borough,
            building_type: None,
            neighborhood: None,
            unit_count: None,
            floor_count: None,
            year_built: None,
            assessed_value: None,
            annual_tax_estimate: None,
            tax_trend_pct: None,
            open_violations: None,
            avg_days_to_close: None,
            ll97_penalty_estimate: None,
            facade_cost_estimate: None,
            compliance_cost_estimate: None,
        }
    }

    /// Converts an upstream record, turning sentinel zeros, negative counts or
    /// amounts, and non-finite numbers into `None`.
    ///
    /// Tax trend may legitimately be negative, so only `0` and non-finite
    /// values are unset for it. An unset compliance total falls back to the
    /// sum of whichever cost components are present.
    pub fn from_raw(raw: &RawBuildingRecord) -> Result<Self, ValidationError> {
        let id = BuildingId::parse(&raw.id)?;
        let borough = raw
            .borough
            .as_deref()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ValidationError(format!("building `{id}` has no borough")))
            .and_then(Borough::parse)?;
        let building_type = match raw.building_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(t) => Some(BuildingType::parse(t)?),
        };
        let neighborhood = match raw.neighborhood.as_deref() {
            None => None,
            Some(n) => normalize_neighborhood(n)?,
        };

        let ll97_penalty_estimate = positive_amount(raw.ll97_penalty_estimate);
        let facade_cost_estimate = positive_amount(raw.facade_cost_estimate);
        let compliance_cost_estimate = positive_amount(raw.compliance_cost_estimate).or_else(|| {
            match (ll97_penalty_estimate, facade_cost_estimate) {
                (None, None) => None,
                (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
            }
        });

        Ok(Self {
            id,
            borough,
            building_type,
            neighborhood,
            unit_count: positive_count(raw.unit_count),
            floor_count: positive_count(raw.floor_count),
            year_built: plausible_year(raw.year_built),
            assessed_value: positive_amount(raw.assessed_value),
            annual_tax_estimate: positive_amount(raw.annual_tax_estimate),
            tax_trend_pct: raw.tax_trend_pct.filter(|v| v.is_finite() && *v != 0.0),
            open_violations: positive_count(raw.open_violations),
            avg_days_to_close: positive_amount(raw.avg_days_to_close),
            ll97_penalty_estimate,
            facade_cost_estimate,
            compliance_cost_estimate,
        })
    }

    pub fn with_building_type(mut self, building_type: &str) -> Result<Self, ValidationError> {
        self.building_type = Some(BuildingType::parse(building_type)?);
        Ok(self)
    }

    pub fn with_neighborhood(mut self, neighborhood: &str) -> Result<Self, ValidationError> {
        self.neighborhood = normalize_neighborhood(neighborhood)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_unit_count(mut self, units: u32) -> Self {
        self.unit_count = Some(units).filter(|u| *u > 0);
        self
    }

    #[must_use]
    pub fn with_floor_count(mut self, floors: u32) -> Self {
        self.floor_count = Some(floors).filter(|f| *f > 0);
        self
    }

    #[must_use]
    pub fn with_year_built(mut self, year: u16) -> Self {
        self.year_built = plausible_year(Some(f64::from(year)));
        self
    }

    #[must_use]
    pub fn with_assessed_value(mut self, value: f64) -> Self {
        self.assessed_value = positive_amount(Some(value));
        self
    }

    #[must_use]
    pub fn with_annual_tax_estimate(mut self, value: f64) -> Self {
        self.annual_tax_estimate = positive_amount(Some(value));
        self
    }

    #[must_use]
    pub fn with_tax_trend_pct(mut self, value: f64) -> Self {
        self.tax_trend_pct = Some(value).filter(|v| v.is_finite() && *v != 0.0);
        self
    }

    #[must_use]
    pub fn with_open_violations(mut self, count: u32) -> Self {
        self.open_violations = Some(count).filter(|c| *c > 0);
        self
    }

    #[must_use]
    pub fn with_avg_days_to_close(mut self, days: f64) -> Self {
        self.avg_days_to_close = positive_amount(Some(days));
        self
    }

    #[must_use]
    pub fn with_ll97_penalty_estimate(mut self, value: f64) -> Self {
        self.ll97_penalty_estimate = positive_amount(Some(value));
        self
    }

    #[must_use]
    pub fn with_facade_cost_estimate(mut self, value: f64) -> Self {
        self.facade_cost_estimate = positive_amount(Some(value));
        self
    }

    #[must_use]
    pub fn with_compliance_cost_estimate(mut self, value: f64) -> Self {
        self.compliance_cost_estimate = positive_amount(Some(value));
        self
    }
}

fn positive_amount(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn plausible_year(value: Option<f64>) -> Option<u16> {
    value
        .filter(|y| y.is_finite() && (YEAR_BUILT_MIN..=YEAR_BUILT_MAX).contains(y))
        .map(|y| y.round() as u16)
}

fn positive_count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.5 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32)
}
