// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use verdant_api::{
    ApiErrorCode, ProgressResponseDto, ScenarioResponseDto, ScenariosResponseDto,
    StoredScenarioDto, API_VERSION,
};
use verdant_metrics::ScenarioProgress;
use verdant_model::Scenario;
use verdant_store::StoredScenario;

fn to_dto(stored: StoredScenario) -> StoredScenarioDto {
    StoredScenarioDto {
        id: stored.id,
        scenario: stored.scenario,
    }
}

fn invalid(e: &verdant_model::ParseError) -> Response {
    reject(
        ApiErrorCode::ValidationFailed,
        "invalid scenario",
        json!({"reason": e.to_string()}),
    )
}

pub(crate) async fn list_scenarios_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.scenarios(&user) {
        Ok(scenarios) => Json(ScenariosResponseDto {
            api_version: API_VERSION.to_string(),
            scenarios: scenarios.into_iter().map(to_dto).collect(),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn create_scenario_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(scenario): Json<Scenario>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(e) = scenario.validate() {
        return invalid(&e);
    }
    let mut store = state.store.lock().await;
    match store.insert_scenario(&user, &scenario) {
        Ok(stored) => Json(ScenarioResponseDto {
            api_version: API_VERSION.to_string(),
            scenario: to_dto(stored),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn update_scenario_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(scenario): Json<Scenario>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(e) = scenario.validate() {
        return invalid(&e);
    }
    let mut store = state.store.lock().await;
    match store.update_scenario(&user, id, &scenario) {
        Ok(stored) => Json(ScenarioResponseDto {
            api_version: API_VERSION.to_string(),
            scenario: to_dto(stored),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn delete_scenario_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.delete_scenario(&user, id) {
        Ok(()) => Json(json!({"api_version": API_VERSION, "deleted": id})).into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn activate_scenario_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut store = state.store.lock().await;
    match store.activate_scenario(&user, id) {
        Ok(stored) => Json(ScenarioResponseDto {
            api_version: API_VERSION.to_string(),
            scenario: to_dto(stored),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

/// Active scenario vs. latest record, computed at read time. Null when
/// either side is missing; that is a state, not an error.
pub(crate) async fn progress_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    let active = match store.active_scenario(&user) {
        Ok(active) => active,
        Err(e) => return storage_reject(&e),
    };
    let latest = match store.latest_record(&user) {
        Ok(latest) => latest,
        Err(e) => return storage_reject(&e),
    };

    let progress = match (active, latest) {
        (Some(scenario), Some(record)) => {
            let readout =
                ScenarioProgress::compute(&scenario.scenario, record.record.total_emissions);
            match serde_json::to_value(readout) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("progress serialization failed: {e}");
                    return reject(
                        ApiErrorCode::Internal,
                        "failed to compute progress",
                        serde_json::Value::Null,
                    );
                }
            }
        }
        _ => None,
    };

    Json(ProgressResponseDto {
        api_version: API_VERSION.to_string(),
        progress,
    })
    .into_response()
}
