// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod rows;
mod schema;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;
use verdant_model::{BusinessProfile, EmissionsRecord, Scenario, UserId, UserReport};

pub const CRATE_NAME: &str = "verdant-store";

pub use schema::SQLITE_SCHEMA_VERSION;

#[derive(Debug)]
#[non_exhaustive]
pub enum StoreError {
    NotFound(&'static str),
    Backend(String),
}

impl StoreError {
    pub(crate) fn backend(err: impl Display) -> Self {
        Self::Backend(err.to_string())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredRecord {
    pub id: i64,
    pub created_at: String,
    pub record: EmissionsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredScenario {
    pub id: i64,
    pub scenario: Scenario,
}

/// Application store over a single SQLite database. Every statement is
/// scoped by `user_id`; no query can cross users.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        schema::schema_version(&self.conn)
    }

    // ---- business profile -------------------------------------------------

    pub fn upsert_profile(
        &self,
        user: &UserId,
        profile: &BusinessProfile,
    ) -> Result<(), StoreError> {
        let energy_sources =
            serde_json::to_string(&profile.energy_sources).map_err(StoreError::backend)?;
        let initiatives = serde_json::to_string(&profile.sustainability_initiatives)
            .map_err(StoreError::backend)?;
        self.conn
            .execute(
                "INSERT INTO business_profiles (
                   user_id, company_name, industry, employee_count, site_count,
                   energy_sources, fleet_description, sustainability_initiatives,
                   reduction_target, budget_posture, logo_reference
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(user_id) DO UPDATE SET
                   company_name = excluded.company_name,
                   industry = excluded.industry,
                   employee_count = excluded.employee_count,
                   site_count = excluded.site_count,
                   energy_sources = excluded.energy_sources,
                   fleet_description = excluded.fleet_description,
                   sustainability_initiatives = excluded.sustainability_initiatives,
                   reduction_target = excluded.reduction_target,
                   budget_posture = excluded.budget_posture,
                   logo_reference = excluded.logo_reference,
                   updated_at = datetime('now')",
                params![
                    user.as_str(),
                    profile.company_name,
                    profile.industry,
                    profile.employee_count as i64,
                    profile.site_count as i64,
                    energy_sources,
                    profile.fleet_description,
                    initiatives,
                    profile.reduction_target,
                    profile.budget_posture,
                    profile.logo_reference,
                ],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    pub fn profile(&self, user: &UserId) -> Result<Option<BusinessProfile>, StoreError> {
        self.conn
            .query_row(
                "SELECT company_name, industry, employee_count, site_count,
                        energy_sources, fleet_description, sustainability_initiatives,
                        reduction_target, budget_posture, logo_reference
                   FROM business_profiles WHERE user_id = ?1",
                params![user.as_str()],
                rows::profile_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
    }

    // ---- emissions records ------------------------------------------------

    /// Insert-only; records have no update or delete path.
    pub fn insert_record(
        &self,
        user: &UserId,
        record: &EmissionsRecord,
    ) -> Result<StoredRecord, StoreError> {
        let site_breakdown = record
            .site_breakdown
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(StoreError::backend)?;
        self.conn
            .execute(
                "INSERT INTO emissions_records (
                   user_id, period_label, period_start, period_end,
                   electricity_total, gas_total, fuel_total, flights_total,
                   water_total, waste_total,
                   scope1_total, scope2_total, scope3_total, total_emissions,
                   site_breakdown, source_file, source_digest
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    user.as_str(),
                    record.period.label,
                    record.period.start.as_ref().map(|d| d.as_str().to_string()),
                    record.period.end.as_ref().map(|d| d.as_str().to_string()),
                    record.categories.electricity,
                    record.categories.gas,
                    record.categories.fuel,
                    record.categories.flights,
                    record.categories.water,
                    record.categories.waste,
                    record.scopes.scope1,
                    record.scopes.scope2,
                    record.scopes.scope3,
                    record.total_emissions,
                    site_breakdown,
                    record.source_file,
                    record.source_digest,
                ],
            )
            .map_err(StoreError::backend)?;
        let id = self.conn.last_insert_rowid();
        self.record_by_id(user, id)?
            .ok_or(StoreError::NotFound("emissions record"))
    }

    fn record_by_id(&self, user: &UserId, id: i64) -> Result<Option<StoredRecord>, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM emissions_records WHERE user_id = ?1 AND id = ?2",
                    rows::RECORD_COLUMNS
                ),
                params![user.as_str(), id],
                rows::record_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
    }

    /// Records in display order: dated periods first, ascending by start
    /// date, then undated periods by label.
    pub fn records_by_period(&self, user: &UserId) -> Result<Vec<StoredRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM emissions_records
                  WHERE user_id = ?1
                  ORDER BY (period_start IS NULL), period_start, period_label, id",
                rows::RECORD_COLUMNS
            ))
            .map_err(StoreError::backend)?;
        let mapped = stmt
            .query_map(params![user.as_str()], rows::record_from_row)
            .map_err(StoreError::backend)?;
        let mut out = Vec::new();
        for row in mapped {
            out.push(row.map_err(StoreError::backend)?);
        }
        Ok(out)
    }

    /// "Latest" is by creation time, not reporting period.
    pub fn latest_record(&self, user: &UserId) -> Result<Option<StoredRecord>, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM emissions_records
                      WHERE user_id = ?1
                      ORDER BY created_at DESC, id DESC LIMIT 1",
                    rows::RECORD_COLUMNS
                ),
                params![user.as_str()],
                rows::record_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
    }

    // ---- scenarios --------------------------------------------------------

    pub fn scenarios(&self, user: &UserId) -> Result<Vec<StoredScenario>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM scenarios WHERE user_id = ?1 ORDER BY created_at, id",
                rows::SCENARIO_COLUMNS
            ))
            .map_err(StoreError::backend)?;
        let mapped = stmt
            .query_map(params![user.as_str()], rows::scenario_from_row)
            .map_err(StoreError::backend)?;
        let mut out = Vec::new();
        for row in mapped {
            out.push(row.map_err(StoreError::backend)?);
        }
        Ok(out)
    }

    pub fn scenario(&self, user: &UserId, id: i64) -> Result<Option<StoredScenario>, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM scenarios WHERE user_id = ?1 AND id = ?2",
                    rows::SCENARIO_COLUMNS
                ),
                params![user.as_str(), id],
                rows::scenario_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
    }

    pub fn active_scenario(&self, user: &UserId) -> Result<Option<StoredScenario>, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM scenarios WHERE user_id = ?1 AND is_active = 1",
                    rows::SCENARIO_COLUMNS
                ),
                params![user.as_str()],
                rows::scenario_from_row,
            )
            .optional()
            .map_err(StoreError::backend)
    }

    /// A scenario created as active displaces the current active one in the
    /// same transaction.
    pub fn insert_scenario(
        &mut self,
        user: &UserId,
        scenario: &Scenario,
    ) -> Result<StoredScenario, StoreError> {
        let reductions =
            serde_json::to_string(&scenario.category_reductions).map_err(StoreError::backend)?;
        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        if scenario.is_active {
            tx.execute(
                "UPDATE scenarios SET is_active = 0 WHERE user_id = ?1",
                params![user.as_str()],
            )
            .map_err(StoreError::backend)?;
        }
        tx.execute(
            "INSERT INTO scenarios (
               user_id, name, description, baseline_total, target_total,
               category_reductions, overall_reduction_pct, timeline_months,
               target_date, is_active
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.as_str(),
                scenario.name,
                scenario.description,
                scenario.baseline_total,
                scenario.target_total,
                reductions,
                scenario.overall_reduction_pct,
                scenario.timeline_months as i64,
                scenario.target_date.as_ref().map(|d| d.as_str().to_string()),
                scenario.is_active as i64,
            ],
        )
        .map_err(StoreError::backend)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(StoreError::backend)?;
        self.scenario(user, id)?
            .ok_or(StoreError::NotFound("scenario"))
    }

    pub fn update_scenario(
        &mut self,
        user: &UserId,
        id: i64,
        scenario: &Scenario,
    ) -> Result<StoredScenario, StoreError> {
        let reductions =
            serde_json::to_string(&scenario.category_reductions).map_err(StoreError::backend)?;
        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        if scenario.is_active {
            tx.execute(
                "UPDATE scenarios SET is_active = 0 WHERE user_id = ?1",
                params![user.as_str()],
            )
            .map_err(StoreError::backend)?;
        }
        let changed = tx
            .execute(
                "UPDATE scenarios SET
                   name = ?3, description = ?4, baseline_total = ?5, target_total = ?6,
                   category_reductions = ?7, overall_reduction_pct = ?8,
                   timeline_months = ?9, target_date = ?10, is_active = ?11
                 WHERE user_id = ?1 AND id = ?2",
                params![
                    user.as_str(),
                    id,
                    scenario.name,
                    scenario.description,
                    scenario.baseline_total,
                    scenario.target_total,
                    reductions,
                    scenario.overall_reduction_pct,
                    scenario.timeline_months as i64,
                    scenario.target_date.as_ref().map(|d| d.as_str().to_string()),
                    scenario.is_active as i64,
                ],
            )
            .map_err(StoreError::backend)?;
        if changed == 0 {
            return Err(StoreError::NotFound("scenario"));
        }
        tx.commit().map_err(StoreError::backend)?;
        self.scenario(user, id)?
            .ok_or(StoreError::NotFound("scenario"))
    }

    pub fn delete_scenario(&self, user: &UserId, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM scenarios WHERE user_id = ?1 AND id = ?2",
                params![user.as_str(), id],
            )
            .map_err(StoreError::backend)?;
        if changed == 0 {
            return Err(StoreError::NotFound("scenario"));
        }
        Ok(())
    }

    /// Clear-then-set in one transaction: a failure anywhere rolls the whole
    /// transition back, so the user never ends up with zero or two active
    /// scenarios. The partial unique index on `scenarios(user_id)` backstops
    /// this at the storage layer.
    pub fn activate_scenario(
        &mut self,
        user: &UserId,
        id: i64,
    ) -> Result<StoredScenario, StoreError> {
        let tx = self.conn.transaction().map_err(StoreError::backend)?;
        let exists: Option<i64> = tx
            .query_row(
                "SELECT id FROM scenarios WHERE user_id = ?1 AND id = ?2",
                params![user.as_str(), id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)?;
        if exists.is_none() {
            return Err(StoreError::NotFound("scenario"));
        }
        tx.execute(
            "UPDATE scenarios SET is_active = 0 WHERE user_id = ?1",
            params![user.as_str()],
        )
        .map_err(StoreError::backend)?;
        tx.execute(
            "UPDATE scenarios SET is_active = 1 WHERE user_id = ?1 AND id = ?2",
            params![user.as_str(), id],
        )
        .map_err(StoreError::backend)?;
        tx.commit().map_err(StoreError::backend)?;
        self.scenario(user, id)?
            .ok_or(StoreError::NotFound("scenario"))
    }

    // ---- user reports -----------------------------------------------------

    pub fn upsert_report(&self, user: &UserId, report: &UserReport) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO user_reports (user_id, source_file, body)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, source_file) DO UPDATE SET
                   body = excluded.body,
                   updated_at = datetime('now')",
                params![user.as_str(), report.source_file, report.body],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    pub fn report(
        &self,
        user: &UserId,
        source_file: &str,
    ) -> Result<Option<UserReport>, StoreError> {
        self.conn
            .query_row(
                "SELECT source_file, body FROM user_reports
                  WHERE user_id = ?1 AND source_file = ?2",
                params![user.as_str(), source_file],
                |row| {
                    Ok(UserReport {
                        source_file: row.get(0)?,
                        body: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::backend)
    }
}
