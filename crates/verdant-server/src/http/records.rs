// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use verdant_api::{ApiErrorCode, RecordsResponseDto, StoredRecordDto, API_VERSION};
use verdant_metrics::{aggregate_by_year, category_breakdown, scope_breakdown};
use verdant_model::UserId;
use verdant_store::StoredRecord;

fn to_dto(stored: StoredRecord) -> StoredRecordDto {
    StoredRecordDto {
        id: stored.id,
        created_at: stored.created_at,
        record: stored.record,
    }
}

pub(crate) async fn records_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.records_by_period(&user) {
        Ok(records) => Json(RecordsResponseDto {
            api_version: API_VERSION.to_string(),
            records: records.into_iter().map(to_dto).collect(),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn latest_record_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    match latest(&state, &headers).await {
        Ok(stored) => Json(json!({
            "api_version": API_VERSION,
            "record": to_dto(stored),
        }))
        .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn category_breakdown_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    match latest(&state, &headers).await {
        Ok(stored) => Json(json!({
            "api_version": API_VERSION,
            "source_record_id": stored.id,
            "breakdown": category_breakdown(&stored.record.categories),
        }))
        .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn scope_breakdown_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    match latest(&state, &headers).await {
        Ok(stored) => Json(json!({
            "api_version": API_VERSION,
            "source_record_id": stored.id,
            "breakdown": scope_breakdown(&stored.record.scopes),
        }))
        .into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn yearly_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.records_by_period(&user) {
        Ok(records) => {
            let rows: Vec<_> = records.into_iter().map(|r| r.record).collect();
            Json(json!({
                "api_version": API_VERSION,
                "yearly": aggregate_by_year(&rows),
            }))
            .into_response()
        }
        Err(e) => storage_reject(&e),
    }
}

async fn latest(state: &AppState, headers: &HeaderMap) -> Result<StoredRecord, Response> {
    let user: UserId = require_user(headers)?;
    let store = state.store.lock().await;
    match store.latest_record(&user) {
        Ok(Some(stored)) => Ok(stored),
        Ok(None) => Err(reject(
            ApiErrorCode::NotFound,
            "emissions record not found",
            Value::Null,
        )),
        Err(e) => Err(storage_reject(&e)),
    }
}
