// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use verdant_model::EmissionsRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct YearGroup {
    pub year: i32,
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
    pub total: f64,
    pub record_count: u64,
}

/// Records without a period-start date cannot be placed in a year group.
/// They are surfaced here instead of being dropped, so the aggregation
/// always accounts for every input record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UnassignedBucket {
    pub record_count: u64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct YearlyAggregation {
    pub years: Vec<YearGroup>,
    pub unassigned: UnassignedBucket,
}

/// Group records by the calendar year of their period-start date, summing
/// scope totals and total emissions per year, ascending year order.
#[must_use]
pub fn aggregate_by_year(records: &[EmissionsRecord]) -> YearlyAggregation {
    let mut by_year: BTreeMap<i32, YearGroup> = BTreeMap::new();
    let mut unassigned = UnassignedBucket::default();

    for record in records {
        match &record.period.start {
            Some(start) => {
                let year = start.year();
                let group = by_year.entry(year).or_insert_with(|| YearGroup {
                    year,
                    ..YearGroup::default()
                });
                group.scope1 += coalesce(record.scopes.scope1);
                group.scope2 += coalesce(record.scopes.scope2);
                group.scope3 += coalesce(record.scopes.scope3);
                group.total += coalesce(record.total_emissions);
                group.record_count += 1;
            }
            None => {
                unassigned.record_count += 1;
                unassigned.total += coalesce(record.total_emissions);
            }
        }
    }

    YearlyAggregation {
        years: by_year.into_values().collect(),
        unassigned,
    }
}

fn coalesce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_model::{CategoryTotals, ReportingPeriod, ScopeTotals};

    fn record(label: &str, total: f64) -> EmissionsRecord {
        EmissionsRecord {
            period: ReportingPeriod::from_label(label).expect("period"),
            categories: CategoryTotals::default(),
            scopes: ScopeTotals {
                scope1: total / 2.0,
                scope2: total / 4.0,
                scope3: total / 4.0,
            },
            total_emissions: total,
            site_breakdown: None,
            source_file: "a.xlsx".to_string(),
            source_digest: None,
        }
    }

    #[test]
    fn groups_by_year_in_ascending_order() {
        let records = vec![
            record("Q1 2025", 100.0),
            record("Q2 2024", 50.0),
            record("Q3 2025", 60.0),
            record("Q4 2024", 30.0),
        ];
        let agg = aggregate_by_year(&records);
        assert_eq!(agg.years.len(), 2);
        assert_eq!(agg.years[0].year, 2024);
        assert_eq!(agg.years[0].total, 80.0);
        assert_eq!(agg.years[0].record_count, 2);
        assert_eq!(agg.years[1].year, 2025);
        assert_eq!(agg.years[1].total, 160.0);
        assert_eq!(agg.unassigned.record_count, 0);
    }

    #[test]
    fn scope_sums_accumulate_within_a_year() {
        let records = vec![record("Q1 2025", 100.0), record("Q2 2025", 100.0)];
        let agg = aggregate_by_year(&records);
        assert_eq!(agg.years[0].scope1, 100.0);
        assert_eq!(agg.years[0].scope2, 50.0);
        assert_eq!(agg.years[0].scope3, 50.0);
    }

    #[test]
    fn dateless_records_land_in_the_unassigned_bucket() {
        let records = vec![
            record("Q1 2025", 100.0),
            record("March audit", 40.0),
            record("ad-hoc upload", 15.0),
        ];
        let agg = aggregate_by_year(&records);
        assert_eq!(agg.years.len(), 1);
        assert_eq!(agg.years[0].record_count, 1);
        assert_eq!(agg.unassigned.record_count, 2);
        assert_eq!(agg.unassigned.total, 55.0);

        // Nothing is lost: groups plus the bucket partition the input.
        let grouped: u64 = agg.years.iter().map(|y| y.record_count).sum();
        assert_eq!(grouped + agg.unassigned.record_count, records.len() as u64);
    }

    #[test]
    fn empty_input_aggregates_to_empty_output() {
        let agg = aggregate_by_year(&[]);
        assert!(agg.years.is_empty());
        assert_eq!(agg.unassigned.record_count, 0);
    }
}
