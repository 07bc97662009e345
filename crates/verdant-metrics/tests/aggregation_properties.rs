// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use verdant_metrics::{aggregate_by_year, category_breakdown, scenario_progress};
use verdant_model::{CategoryTotals, EmissionsRecord, ReportingPeriod, ScopeTotals};

fn record(year: Option<u16>, total: f64) -> EmissionsRecord {
    let period = match year {
        Some(y) => ReportingPeriod::from_label(format!("Q1 {y}")).expect("quarter"),
        None => ReportingPeriod::from_label("ad hoc").expect("label"),
    };
    EmissionsRecord {
        period,
        categories: CategoryTotals::default(),
        scopes: ScopeTotals::default(),
        total_emissions: total,
        site_breakdown: None,
        source_file: "f.xlsx".to_string(),
        source_digest: None,
    }
}

proptest! {
    #[test]
    fn breakdown_sum_equals_source_sum(
        electricity in 0.0f64..1.0e6,
        gas in 0.0f64..1.0e6,
        fuel in 0.0f64..1.0e6,
        flights in 0.0f64..1.0e6,
        water in 0.0f64..1.0e6,
        waste in 0.0f64..1.0e6,
    ) {
        let totals = CategoryTotals { electricity, gas, fuel, flights, water, waste };
        let slices = category_breakdown(&totals);
        let sum: f64 = slices.iter().map(|s| s.value).sum();
        prop_assert!((sum - totals.sum()).abs() < 1e-6);
    }

    #[test]
    fn yearly_grouping_partitions_every_record(
        years in proptest::collection::vec(proptest::option::of(2000u16..2100), 0..64),
    ) {
        let records: Vec<_> = years.iter().map(|y| record(*y, 10.0)).collect();
        let agg = aggregate_by_year(&records);
        let grouped: u64 = agg.years.iter().map(|g| g.record_count).sum();
        prop_assert_eq!(grouped + agg.unassigned.record_count, records.len() as u64);

        let grouped_total: f64 = agg.years.iter().map(|g| g.total).sum();
        let all_total = grouped_total + agg.unassigned.total;
        prop_assert!((all_total - 10.0 * records.len() as f64).abs() < 1e-6);

        let year_labels: Vec<i32> = agg.years.iter().map(|g| g.year).collect();
        let mut sorted = year_labels.clone();
        sorted.sort_unstable();
        prop_assert_eq!(year_labels, sorted);
    }

    #[test]
    fn progress_is_always_a_percentage(
        baseline in 0.0f64..1.0e6,
        target in 0.0f64..1.0e6,
        current in 0.0f64..1.0e6,
    ) {
        let p = scenario_progress(baseline, target, current);
        prop_assert!(p.is_finite());
        prop_assert!((0.0..=100.0).contains(&p));
    }
}
