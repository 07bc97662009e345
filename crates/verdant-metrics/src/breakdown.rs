// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use verdant_model::{CategoryTotals, EmissionsCategory, Scope, ScopeTotals};

/// One slice of a category or scope chart. Colors are fixed per series so
/// every chart in the product renders a category the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

const fn category_color(category: EmissionsCategory) -> &'static str {
    match category {
        EmissionsCategory::Electricity => "#f59e0b",
        EmissionsCategory::Gas => "#3b82f6",
        EmissionsCategory::Fuel => "#ef4444",
        EmissionsCategory::Flights => "#8b5cf6",
        EmissionsCategory::Water => "#06b6d4",
        EmissionsCategory::Waste => "#84cc16",
        // `EmissionsCategory` is `#[non_exhaustive]`; only `::ALL` variants
        // ever reach this function.
        _ => unreachable!(),
    }
}

const fn scope_color(scope: Scope) -> &'static str {
    match scope {
        Scope::Scope1 => "#ef4444",
        Scope::Scope2 => "#f59e0b",
        Scope::Scope3 => "#3b82f6",
        // `Scope` is `#[non_exhaustive]`; only `::ALL` variants reach here.
        _ => unreachable!(),
    }
}

#[must_use]
pub fn category_breakdown(totals: &CategoryTotals) -> Vec<ChartSlice> {
    EmissionsCategory::ALL
        .iter()
        .map(|category| ChartSlice {
            name: category.as_str().to_string(),
            value: coalesce(totals.get(*category)),
            color: category_color(*category),
        })
        .collect()
}

#[must_use]
pub fn scope_breakdown(totals: &ScopeTotals) -> Vec<ChartSlice> {
    Scope::ALL
        .iter()
        .map(|scope| ChartSlice {
            name: scope.display_name().to_string(),
            value: coalesce(totals.get(*scope)),
            color: scope_color(*scope),
        })
        .collect()
}

// Malformed numerics coalesce to zero everywhere in the metrics layer.
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

    #[test]
    fn category_breakdown_preserves_the_source_sum() {
        let totals = CategoryTotals {
            electricity: 120.5,
            gas: 40.0,
            fuel: 33.25,
            flights: 18.0,
            water: 2.5,
            waste: 9.75,
        };
        let slices = category_breakdown(&totals);
        assert_eq!(slices.len(), 6);
        let sum: f64 = slices.iter().map(|s| s.value).sum();
        assert!((sum - totals.sum()).abs() < 1e-9);
    }

    #[test]
    fn scope_breakdown_has_one_slice_per_scope_with_stable_colors() {
        let totals = ScopeTotals {
            scope1: 73.0,
            scope2: 120.0,
            scope3: 31.0,
        };
        let slices = scope_breakdown(&totals);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].name, "Scope 1");
        assert_eq!(slices[0].value, 73.0);
        assert_ne!(slices[0].color, slices[1].color);
        assert_ne!(slices[1].color, slices[2].color);
    }

    #[test]
    fn non_finite_values_render_as_zero() {
        let totals = CategoryTotals {
            electricity: f64::NAN,
            ..CategoryTotals::default()
        };
        let slices = category_breakdown(&totals);
        assert_eq!(slices[0].value, 0.0);
    }
}
