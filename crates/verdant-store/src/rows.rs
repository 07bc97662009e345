// SPDX-License-Identifier: Apache-2.0

use crate::{StoredRecord, StoredScenario};
use rusqlite::types::Type;
use rusqlite::Row;
use std::collections::BTreeMap;
use verdant_model::{
    BusinessProfile, CategoryTotals, EmissionsRecord, IsoDate, ReportingPeriod, Scenario,
    ScopeTotals,
};

pub(crate) const RECORD_COLUMNS: &str = "id, created_at, period_label, period_start, period_end, \
     electricity_total, gas_total, fuel_total, flights_total, water_total, waste_total, \
     scope1_total, scope2_total, scope3_total, total_emissions, \
     site_breakdown, source_file, source_digest";

pub(crate) const SCENARIO_COLUMNS: &str = "id, name, description, baseline_total, target_total, \
     category_reductions, overall_reduction_pct, timeline_months, target_date, is_active";

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<IsoDate>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(text) => IsoDate::parse(&text)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

fn json_map_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<BTreeMap<String, f64>>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let label: String = row.get(2)?;
    let period = ReportingPeriod {
        label,
        start: date_column(row, 3)?,
        end: date_column(row, 4)?,
    };
    Ok(StoredRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        record: EmissionsRecord {
            period,
            categories: CategoryTotals {
                electricity: row.get(5)?,
                gas: row.get(6)?,
                fuel: row.get(7)?,
                flights: row.get(8)?,
                water: row.get(9)?,
                waste: row.get(10)?,
            },
            scopes: ScopeTotals {
                scope1: row.get(11)?,
                scope2: row.get(12)?,
                scope3: row.get(13)?,
            },
            total_emissions: row.get(14)?,
            site_breakdown: json_map_column(row, 15)?,
            source_file: row.get(16)?,
            source_digest: row.get(17)?,
        },
    })
}

pub(crate) fn scenario_from_row(row: &Row<'_>) -> rusqlite::Result<StoredScenario> {
    let reductions_raw: String = row.get(5)?;
    let category_reductions: BTreeMap<String, f64> =
        serde_json::from_str(&reductions_raw).map_err(|e| conversion_error(5, e))?;
    let timeline: i64 = row.get(7)?;
    Ok(StoredScenario {
        id: row.get(0)?,
        scenario: Scenario {
            name: row.get(1)?,
            description: row.get(2)?,
            baseline_total: row.get(3)?,
            target_total: row.get(4)?,
            category_reductions,
            overall_reduction_pct: row.get(6)?,
            timeline_months: u32::try_from(timeline).unwrap_or(0),
            target_date: date_column(row, 8)?,
            is_active: row.get::<_, i64>(9)? != 0,
        },
    })
}

pub(crate) fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<BusinessProfile> {
    let energy_raw: String = row.get(4)?;
    let initiatives_raw: String = row.get(6)?;
    let energy_sources: Vec<String> =
        serde_json::from_str(&energy_raw).map_err(|e| conversion_error(4, e))?;
    let sustainability_initiatives: Vec<String> =
        serde_json::from_str(&initiatives_raw).map_err(|e| conversion_error(6, e))?;
    let employee_count: i64 = row.get(2)?;
    let site_count: i64 = row.get(3)?;
    Ok(BusinessProfile {
        company_name: row.get(0)?,
        industry: row.get(1)?,
        employee_count: u64::try_from(employee_count).unwrap_or(0),
        site_count: u64::try_from(site_count).unwrap_or(0),
        energy_sources,
        fleet_description: row.get(5)?,
        sustainability_initiatives,
        reduction_target: row.get(7)?,
        budget_posture: row.get(8)?,
        logo_reference: row.get(9)?,
    })
}
