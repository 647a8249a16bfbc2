// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Which direction counts as "better" when a rank is rendered for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

impl Polarity {
    /// Share of peers the target beats, given its raw percentile rank.
    #[must_use]
    pub fn better_than_pct(self, percentile_rank: f64) -> f64 {
        match self {
            Self::HigherIsBetter => percentile_rank,
            Self::LowerIsBetter => 100.0 - percentile_rank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum MetricName {
    AssessedValue,
    AnnualTax,
    TaxTrendPct,
    OpenViolations,
    AvgDaysToClose,
    ComplianceCost,
    Ll97Penalty,
    ComplianceCostPerUnit,
    ViolationsPerUnit,
    TaxPerUnit,
}

impl MetricName {
    pub const ALL: [Self; 10] = [
        Self::AssessedValue,
        Self::AnnualTax,
        Self::TaxTrendPct,
        Self::OpenViolations,
        Self::AvgDaysToClose,
        Self::ComplianceCost,
        Self::Ll97Penalty,
        Self::ComplianceCostPerUnit,
        Self::ViolationsPerUnit,
        Self::TaxPerUnit,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssessedValue => "assessed_value",
            Self::AnnualTax => "annual_tax",
            Self::TaxTrendPct => "tax_trend_pct",
            Self::OpenViolations => "open_violations",
            Self::AvgDaysToClose => "avg_days_to_close",
            Self::ComplianceCost => "compliance_cost",
            Self::Ll97Penalty => "ll97_penalty",
            Self::ComplianceCostPerUnit => "compliance_cost_per_unit",
            Self::ViolationsPerUnit => "violations_per_unit",
            Self::TaxPerUnit => "tax_per_unit",
        }
    }

    #[must_use]
    pub const fn polarity(self) -> Polarity {
        match self {
            Self::AssessedValue => Polarity::HigherIsBetter,
            Self::AnnualTax
            | Self::TaxTrendPct
            | Self::OpenViolations
            | Self::AvgDaysToClose
            | Self::ComplianceCost
            | Self::Ll97Penalty
            | Self::ComplianceCostPerUnit
            | Self::ViolationsPerUnit
            | Self::TaxPerUnit => Polarity::LowerIsBetter,
        }
    }
}

impl Display for MetricName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparable metrics of one building. Only present, finite values are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVector(BTreeMap<MetricName, f64>);

impl MetricVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` if it is finite; returns whether it was kept.
    pub fn insert(&mut self, metric: MetricName, value: f64) -> bool {
        if value.is_finite() {
            self.0.insert(metric, value);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn get(&self, metric: MetricName) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    #[must_use]
    pub fn contains(&self, metric: MetricName) -> bool {
        self.0.contains_key(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
