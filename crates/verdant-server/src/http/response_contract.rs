// SPDX-License-Identifier: Apache-2.0

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use verdant_api::{ApiError, ApiErrorCode};

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ApiErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ApiErrorCode::WorkflowResponseInvalid | ApiErrorCode::UpstreamUnavailable => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    let mut resp = (status, body).into_response();
    if status == StatusCode::TOO_MANY_REQUESTS {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static("3"));
    }
    resp
}

#[must_use]
pub(crate) fn api_error(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError {
        code,
        message: message.to_string(),
        details,
        request_id: "req-unknown".to_string(),
    }
}

/// Shorthand for the common reject path: build, map, respond.
#[must_use]
pub(crate) fn reject(code: ApiErrorCode, message: &str, details: Value) -> Response {
    let err = api_error(code, message, details);
    api_error_response(api_error_status(code), err)
}

#[must_use]
pub(crate) fn storage_reject(err: &verdant_store::StoreError) -> Response {
    match err {
        verdant_store::StoreError::NotFound(entity) => reject(
            ApiErrorCode::NotFound,
            &format!("{entity} not found"),
            Value::Null,
        ),
        verdant_store::StoreError::Backend(msg) => {
            tracing::error!("storage failure: {msg}");
            reject(
                ApiErrorCode::StorageFailure,
                "storage operation failed, please try again",
                Value::Null,
            )
        }
        // `StoreError` is `#[non_exhaustive]`; any future variant degrades to
        // the same generic storage-failure response as `Backend`.
        _ => {
            tracing::error!("storage failure: {err}");
            reject(
                ApiErrorCode::StorageFailure,
                "storage operation failed, please try again",
                Value::Null,
            )
        }
    }
}
