// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::Connection;

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

pub(crate) fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        PRAGMA temp_store=MEMORY;

        CREATE TABLE IF NOT EXISTS business_profiles (
          user_id TEXT PRIMARY KEY,
          company_name TEXT NOT NULL,
          industry TEXT NOT NULL,
          employee_count INTEGER NOT NULL,
          site_count INTEGER NOT NULL,
          energy_sources TEXT NOT NULL,
          fleet_description TEXT NOT NULL,
          sustainability_initiatives TEXT NOT NULL,
          reduction_target TEXT NOT NULL,
          budget_posture TEXT NOT NULL,
          logo_reference TEXT,
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) WITHOUT ROWID;

        CREATE TABLE IF NOT EXISTS emissions_records (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id TEXT NOT NULL,
          period_label TEXT NOT NULL,
          period_start TEXT,
          period_end TEXT,
          electricity_total REAL NOT NULL,
          gas_total REAL NOT NULL,
          fuel_total REAL NOT NULL,
          flights_total REAL NOT NULL,
          water_total REAL NOT NULL,
          waste_total REAL NOT NULL,
          scope1_total REAL NOT NULL,
          scope2_total REAL NOT NULL,
          scope3_total REAL NOT NULL,
          total_emissions REAL NOT NULL,
          site_breakdown TEXT,
          source_file TEXT NOT NULL,
          source_digest TEXT,
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_records_user_period
          ON emissions_records(user_id, period_start, period_label);
        CREATE INDEX IF NOT EXISTS idx_records_user_created
          ON emissions_records(user_id, created_at);

        CREATE TABLE IF NOT EXISTS scenarios (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id TEXT NOT NULL,
          name TEXT NOT NULL,
          description TEXT,
          baseline_total REAL NOT NULL,
          target_total REAL NOT NULL,
          category_reductions TEXT NOT NULL,
          overall_reduction_pct REAL NOT NULL,
          timeline_months INTEGER NOT NULL,
          target_date TEXT,
          is_active INTEGER NOT NULL DEFAULT 0,
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_scenarios_user ON scenarios(user_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_scenarios_one_active_per_user
          ON scenarios(user_id) WHERE is_active = 1;

        CREATE TABLE IF NOT EXISTS user_reports (
          user_id TEXT NOT NULL,
          source_file TEXT NOT NULL,
          body TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          PRIMARY KEY (user_id, source_file)
        ) WITHOUT ROWID;
        ",
    )
    .map_err(StoreError::backend)?;
    conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))
        .map_err(StoreError::backend)?;
    Ok(())
}

pub(crate) fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .map_err(StoreError::backend)
}
