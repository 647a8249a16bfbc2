// SPDX-License-Identifier: Apache-2.0

use peerbench_model::{BuildingRecord, MetricName, MetricVector};

/// Metric vector of one building plus the metrics it could not supply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricExtraction {
    pub metrics: MetricVector,
    pub missing: Vec<MetricName>,
}

impl MetricExtraction {
    /// A building with no metrics at all cannot be benchmarked.
    #[must_use]
    pub fn is_benchmarkable(&self) -> bool {
        !self.metrics.is_empty()
    }
}

#[must_use]
pub fn extract_metrics(record: &BuildingRecord) -> MetricExtraction {
    let units = record.unit_count.map(f64::from);
    let violations = record.open_violations.map(f64::from);
    let per_unit = |value: Option<f64>| match (value, units) {
        (Some(v), Some(u)) if u > 0.0 => Some(v / u),
        _ => None,
    };

    let mut extraction = MetricExtraction::default();
    for metric in MetricName::ALL {
        let value = match metric {
            MetricName::AssessedValue => record.assessed_value,
            MetricName::AnnualTax => record.annual_tax_estimate,
            MetricName::TaxTrendPct => record.tax_trend_pct,
            MetricName::OpenViolations => violations,
            MetricName::AvgDaysToClose => record.avg_days_to_close,
            MetricName::ComplianceCost => record.compliance_cost_estimate,
            MetricName::Ll97Penalty => record.ll97_penalty_estimate,
            MetricName::ComplianceCostPerUnit => per_unit(record.compliance_cost_estimate),
            MetricName::ViolationsPerUnit => per_unit(violations),
            MetricName::TaxPerUnit => per_unit(record.annual_tax_estimate),
            _ => None,
        };
        let kept = value.is_some_and(|v| extraction.metrics.insert(metric, v));
        if !kept {
            extraction.missing.push(metric);
        }
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerbench_model::{Borough, BuildingId, RawBuildingRecord};

    #[test]
    fn sentinel_zeros_never_reach_the_vector() {
        let raw = RawBuildingRecord {
            id: "4-00001-0001".to_string(),
            borough: Some("queens".to_string()),
            unit_count: Some(0.0),
            open_violations: Some(0.0),
            annual_tax_estimate: Some(24_000.0),
            ..RawBuildingRecord::default()
        };
        let record = BuildingRecord::from_raw(&raw).expect("record");
        let extraction = extract_metrics(&record);
        assert_eq!(extraction.metrics.get(MetricName::AnnualTax), Some(24_000.0));
        assert!(!extraction.metrics.contains(MetricName::OpenViolations));
        assert!(!extraction.metrics.contains(MetricName::TaxPerUnit));
        assert!(extraction.missing.contains(&MetricName::OpenViolations));
    }

    #[test]
    fn per_unit_metrics_need_a_unit_count() {
        let record = BuildingRecord::new(BuildingId::parse("b1").expect("id"), Borough::Bronx)
            .with_unit_count(40)
            .with_open_violations(10)
            .with_compliance_cost_estimate(80_000.0);
        let extraction = extract_metrics(&record);
        assert_eq!(extraction.metrics.get(MetricName::ViolationsPerUnit), Some(0.25));
        assert_eq!(
            extraction.metrics.get(MetricName::ComplianceCostPerUnit),
            Some(2_000.0)
        );
        assert_eq!(extraction.metrics.len() + extraction.missing.len(), MetricName::ALL.len());
    }

    #[test]
    fn empty_record_is_not_benchmarkable() {
        let record = BuildingRecord::new(BuildingId::parse("b2").expect("id"), Borough::Bronx)
            .with_unit_count(12)
            .with_year_built(1931);
        let extraction = extract_metrics(&record);
        assert!(!extraction.is_benchmarkable());
        assert_eq!(extraction.missing.len(), MetricName::ALL.len());
    }
}
