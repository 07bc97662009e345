// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use verdant_api::{ApiErrorCode, ReportResponseDto, API_VERSION};
use verdant_model::UserReport;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PutReportBody {
    body: String,
}

pub(crate) async fn get_report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(source_file): Path<String>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.report(&user, &source_file) {
        Ok(Some(report)) => Json(ReportResponseDto {
            api_version: API_VERSION.to_string(),
            report,
        })
        .into_response(),
        Ok(None) => reject(ApiErrorCode::NotFound, "report not found", Value::Null),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn put_report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(source_file): Path<String>,
    Json(payload): Json<PutReportBody>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let report = UserReport {
        source_file,
        body: payload.body,
    };
    if let Err(e) = report.validate() {
        return reject(
            ApiErrorCode::ValidationFailed,
            "invalid report",
            json!({"reason": e.to_string()}),
        );
    }
    let store = state.store.lock().await;
    match store.upsert_report(&user, &report) {
        Ok(()) => Json(ReportResponseDto {
            api_version: API_VERSION.to_string(),
            report,
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}
