// SPDX-License-Identifier: Apache-2.0

use crate::{render_metrics, AppState, SERVER_VERSION};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use verdant_api::{openapi_v1_spec, API_VERSION};

pub(crate) async fn healthz_handler() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    if state.ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    (StatusCode::OK, render_metrics(&state.metrics)).into_response()
}

pub(crate) async fn version_handler() -> Response {
    Json(json!({
        "name": "verdant-server",
        "version": SERVER_VERSION,
        "api_version": API_VERSION,
    }))
    .into_response()
}

pub(crate) async fn openapi_handler() -> Response {
    Json(openapi_v1_spec()).into_response()
}
