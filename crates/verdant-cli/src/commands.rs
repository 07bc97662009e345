// SPDX-License-Identifier: Apache-2.0

use serde_json::json;
use std::fs;
use std::path::Path;
use verdant_core::sha256_hex;
use verdant_ingest::{normalize_workflow_response, UploadFields};
use verdant_metrics::{aggregate_by_year, ScenarioProgress};
use verdant_model::UserId;
use verdant_store::Store;

pub(crate) fn init(db: &Path) -> Result<(), String> {
    if let Some(parent) = db.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("create db dir failed: {e}"))?;
    }
    let store = Store::open(db).map_err(|e| e.to_string())?;
    let version = store.schema_version().map_err(|e| e.to_string())?;
    println!("initialized {} (schema version {version})", db.display());
    Ok(())
}

pub(crate) fn import(
    db: &Path,
    user: &str,
    response: &Path,
    source_file: &str,
    reporting_period: Option<String>,
    json_output: bool,
) -> Result<(), String> {
    let user = UserId::parse(user).map_err(|e| e.to_string())?;
    let raw = fs::read_to_string(response)
        .map_err(|e| format!("read {} failed: {e}", response.display()))?;
    let normalized = normalize_workflow_response(&raw).map_err(|e| e.to_string())?;

    let fields = UploadFields::new(user.clone(), source_file.to_string(), reporting_period);
    let record = normalized
        .into_record(
            fields.record_period(),
            source_file.to_string(),
            Some(sha256_hex(raw.as_bytes())),
        )
        .map_err(|e| e.to_string())?;

    let store = Store::open(db).map_err(|e| e.to_string())?;
    let stored = store.insert_record(&user, &record).map_err(|e| e.to_string())?;

    if json_output {
        let out = serde_json::to_string_pretty(&stored).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        println!(
            "imported record {} ({}; total {:.1} kg CO2e)",
            stored.id, stored.record.period.label, stored.record.total_emissions
        );
    }
    Ok(())
}

pub(crate) fn records(db: &Path, user: &str, json_output: bool) -> Result<(), String> {
    let user = UserId::parse(user).map_err(|e| e.to_string())?;
    let store = Store::open(db).map_err(|e| e.to_string())?;
    let records = store.records_by_period(&user).map_err(|e| e.to_string())?;

    if json_output {
        let out = serde_json::to_string_pretty(&records).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }
    if records.is_empty() {
        println!("no records for {}", user.as_str());
        return Ok(());
    }
    for stored in records {
        println!(
            "{:>6}  {:<16} total {:>10.1}  scopes {:>8.1}/{:>8.1}/{:>8.1}  {}",
            stored.id,
            stored.record.period.label,
            stored.record.total_emissions,
            stored.record.scopes.scope1,
            stored.record.scopes.scope2,
            stored.record.scopes.scope3,
            stored.record.source_file,
        );
    }
    Ok(())
}

pub(crate) fn summary(db: &Path, user: &str, json_output: bool) -> Result<(), String> {
    let user = UserId::parse(user).map_err(|e| e.to_string())?;
    let store = Store::open(db).map_err(|e| e.to_string())?;

    let records = store.records_by_period(&user).map_err(|e| e.to_string())?;
    let rows: Vec<_> = records.iter().map(|r| r.record.clone()).collect();
    let yearly = aggregate_by_year(&rows);
    let latest = store.latest_record(&user).map_err(|e| e.to_string())?;
    let active = store.active_scenario(&user).map_err(|e| e.to_string())?;

    let progress = match (&active, &latest) {
        (Some(scenario), Some(record)) => Some(ScenarioProgress::compute(
            &scenario.scenario,
            record.record.total_emissions,
        )),
        _ => None,
    };

    if json_output {
        let out = serde_json::to_string_pretty(&json!({
            "record_count": records.len(),
            "yearly": yearly,
            "latest": latest,
            "progress": progress,
        }))
        .map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!("records: {}", records.len());
    for year in &yearly.years {
        println!(
            "  {}: total {:>10.1} over {} record(s)",
            year.year, year.total, year.record_count
        );
    }
    if yearly.unassigned.record_count > 0 {
        println!(
            "  unassigned: total {:>10.1} over {} record(s)",
            yearly.unassigned.total, yearly.unassigned.record_count
        );
    }
    match progress {
        Some(p) => println!(
            "active scenario '{}': {:.0}% toward {:.1} (currently {:.1}, {:?})",
            p.scenario_name, p.progress_pct, p.target_total, p.current_total, p.status
        ),
        None => println!("no active scenario progress (needs an active scenario and a record)"),
    }
    Ok(())
}
