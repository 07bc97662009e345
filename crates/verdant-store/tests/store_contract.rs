// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use tempfile::tempdir;
use verdant_model::{
    BusinessProfile, CategoryTotals, EmissionsRecord, ReportingPeriod, Scenario, ScopeTotals,
    UserId, UserReport,
};
use verdant_store::{Store, StoreError};

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("user id")
}

fn record(label: &str, total: f64) -> EmissionsRecord {
    EmissionsRecord {
        period: ReportingPeriod::from_label(label).expect("period"),
        categories: CategoryTotals {
            electricity: total / 2.0,
            gas: total / 2.0,
            ..CategoryTotals::default()
        },
        scopes: ScopeTotals {
            scope1: total / 2.0,
            scope2: total / 2.0,
            scope3: 0.0,
        },
        total_emissions: total,
        site_breakdown: Some(BTreeMap::from([("hq".to_string(), total)])),
        source_file: format!("{label}.xlsx"),
        source_digest: None,
    }
}

fn scenario(name: &str, active: bool) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: Some("test plan".to_string()),
        baseline_total: 224.0,
        target_total: 180.0,
        category_reductions: BTreeMap::from([("fuel".to_string(), 25.0)]),
        overall_reduction_pct: 20.0,
        timeline_months: 12,
        target_date: None,
        is_active: active,
    }
}

#[test]
fn schema_initializes_on_open() {
    let dir = tempdir().expect("tmp");
    let store = Store::open(&dir.path().join("verdant.db")).expect("open");
    assert_eq!(store.schema_version().expect("version"), 1);
}

#[test]
fn profile_upsert_keeps_a_single_row_per_user() {
    let store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    let mut profile = BusinessProfile {
        company_name: "Acme Logistics".to_string(),
        industry: "logistics".to_string(),
        employee_count: 120,
        site_count: 3,
        energy_sources: vec!["grid".to_string(), "solar".to_string()],
        fleet_description: "12 diesel vans".to_string(),
        sustainability_initiatives: vec!["LED retrofit".to_string()],
        reduction_target: "20% by 2030".to_string(),
        budget_posture: "moderate".to_string(),
        logo_reference: None,
    };
    store.upsert_profile(&u, &profile).expect("first save");

    profile.company_name = "Acme Logistics Ltd".to_string();
    profile.logo_reference = Some("logos/acme.png".to_string());
    store.upsert_profile(&u, &profile).expect("second save");

    let fetched = store.profile(&u).expect("fetch").expect("present");
    assert_eq!(fetched, profile);
}

#[test]
fn missing_profile_reads_as_none() {
    let store = Store::open_in_memory().expect("open");
    assert!(store.profile(&user("nobody")).expect("fetch").is_none());
}

#[test]
fn records_round_trip_and_latest_is_by_creation_order() {
    let store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    let first = store.insert_record(&u, &record("Q2 2025", 100.0)).expect("insert 1");
    let second = store.insert_record(&u, &record("Q1 2025", 80.0)).expect("insert 2");
    assert_ne!(first.id, second.id);
    assert_eq!(second.record.site_breakdown.as_ref().expect("sites").len(), 1);

    // Latest is the most recently created, even though its period sorts
    // earlier.
    let latest = store.latest_record(&u).expect("latest").expect("present");
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.record.period.label, "Q1 2025");
}

#[test]
fn listing_orders_dated_periods_first_ascending() {
    let store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    store.insert_record(&u, &record("Q3 2025", 10.0)).expect("q3");
    store.insert_record(&u, &record("ad-hoc batch", 5.0)).expect("undated");
    store.insert_record(&u, &record("Q1 2025", 20.0)).expect("q1");

    let listed = store.records_by_period(&u).expect("list");
    let labels: Vec<&str> = listed.iter().map(|r| r.record.period.label.as_str()).collect();
    assert_eq!(labels, vec!["Q1 2025", "Q3 2025", "ad-hoc batch"]);
}

#[test]
fn activation_leaves_exactly_one_active_scenario() {
    let mut store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    let a = store.insert_scenario(&u, &scenario("A", true)).expect("a");
    let b = store.insert_scenario(&u, &scenario("B", false)).expect("b");
    assert!(a.scenario.is_active);
    assert!(!b.scenario.is_active);

    let activated = store.activate_scenario(&u, b.id).expect("activate b");
    assert!(activated.scenario.is_active);

    let all = store.scenarios(&u).expect("list");
    let active: Vec<_> = all.iter().filter(|s| s.scenario.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
    assert_eq!(active[0].scenario.name, "B");
}

#[test]
fn inserting_an_active_scenario_displaces_the_previous_one() {
    let mut store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    let a = store.insert_scenario(&u, &scenario("A", true)).expect("a");
    let b = store.insert_scenario(&u, &scenario("B", true)).expect("b");

    let all = store.scenarios(&u).expect("list");
    let active: Vec<_> = all.iter().filter(|s| s.scenario.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
    assert_ne!(a.id, b.id);
    assert_eq!(
        store.active_scenario(&u).expect("active").expect("present").id,
        b.id
    );
}

#[test]
fn scenario_update_and_delete_respect_ownership() {
    let mut store = Store::open_in_memory().expect("open");
    let owner = user("owner");
    let stranger = user("stranger");

    let created = store.insert_scenario(&owner, &scenario("Plan", false)).expect("insert");

    let mut updated = scenario("Plan v2", false);
    updated.timeline_months = 24;
    assert!(matches!(
        store.update_scenario(&stranger, created.id, &updated),
        Err(StoreError::NotFound(_))
    ));
    let saved = store
        .update_scenario(&owner, created.id, &updated)
        .expect("owner update");
    assert_eq!(saved.scenario.name, "Plan v2");
    assert_eq!(saved.scenario.timeline_months, 24);

    assert!(matches!(
        store.delete_scenario(&stranger, created.id),
        Err(StoreError::NotFound(_))
    ));
    store.delete_scenario(&owner, created.id).expect("owner delete");
    assert!(store.scenario(&owner, created.id).expect("gone").is_none());
}

#[test]
fn activating_an_unknown_scenario_is_not_found() {
    let mut store = Store::open_in_memory().expect("open");
    assert!(matches!(
        store.activate_scenario(&user("user-1"), 999),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn reports_upsert_by_source_file() {
    let store = Store::open_in_memory().expect("open");
    let u = user("user-1");

    let report = UserReport {
        source_file: "q1.xlsx".to_string(),
        body: "<h1>Q1 report</h1>".to_string(),
    };
    store.upsert_report(&u, &report).expect("first save");

    let replacement = UserReport {
        source_file: "q1.xlsx".to_string(),
        body: "<h1>Q1 report, revised</h1>".to_string(),
    };
    store.upsert_report(&u, &replacement).expect("second save");

    let fetched = store.report(&u, "q1.xlsx").expect("fetch").expect("present");
    assert_eq!(fetched.body, "<h1>Q1 report, revised</h1>");
    assert!(store.report(&u, "q2.xlsx").expect("fetch").is_none());
}

#[test]
fn rows_never_cross_users() {
    let mut store = Store::open_in_memory().expect("open");
    let alice = user("alice");
    let bob = user("bob");

    store.insert_record(&alice, &record("Q1 2025", 50.0)).expect("insert");
    store.insert_scenario(&alice, &scenario("A", true)).expect("scenario");

    assert!(store.latest_record(&bob).expect("latest").is_none());
    assert!(store.records_by_period(&bob).expect("list").is_empty());
    assert!(store.scenarios(&bob).expect("scenarios").is_empty());
    assert!(store.active_scenario(&bob).expect("active").is_none());

    // Both users can hold an active scenario at the same time.
    store.insert_scenario(&bob, &scenario("B", true)).expect("bob scenario");
    assert!(store.active_scenario(&alice).expect("alice active").is_some());
    assert!(store.active_scenario(&bob).expect("bob active").is_some());
}
