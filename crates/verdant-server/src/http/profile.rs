// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use verdant_api::{ApiErrorCode, ProfileResponseDto, API_VERSION};
use verdant_model::BusinessProfile;

pub(crate) async fn get_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let store = state.store.lock().await;
    match store.profile(&user) {
        Ok(profile) => Json(ProfileResponseDto {
            api_version: API_VERSION.to_string(),
            profile,
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}

pub(crate) async fn put_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(profile): Json<BusinessProfile>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(e) = profile.validate() {
        return reject(
            ApiErrorCode::ValidationFailed,
            "invalid business profile",
            json!({"reason": e.to_string()}),
        );
    }
    let store = state.store.lock().await;
    match store.upsert_profile(&user, &profile) {
        Ok(()) => Json(ProfileResponseDto {
            api_version: API_VERSION.to_string(),
            profile: Some(profile),
        })
        .into_response(),
        Err(e) => storage_reject(&e),
    }
}
