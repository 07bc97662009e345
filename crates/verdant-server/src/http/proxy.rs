// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tracing::warn;

/// Deliberate CORS-bypass shim: the browser posts the spreadsheet here and
/// this endpoint relays it to the calculation workflow verbatim, so the
/// workflow host never needs to answer preflights. Every response carries
/// permissive CORS headers.
pub(crate) async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    state
        .metrics
        .proxy_requests_total
        .fetch_add(1, Ordering::Relaxed);

    if request.method() == Method::OPTIONS {
        with_cors(StatusCode::OK.into_response())
    } else if request.method() == Method::POST {
        relay(state, request).await
    } else {
        with_cors(
            (
                StatusCode::METHOD_NOT_ALLOWED,
                axum::Json(json!({"error": "method not allowed"})),
            )
                .into_response(),
        )
    }
}

async fn relay(state: AppState, request: Request<Body>) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let body = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            return with_cors(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({
                        "error": "failed to read request body",
                        "details": e.to_string(),
                    })),
                )
                    .into_response(),
            )
        }
    };

    let upstream = match state.upstream.calculate_raw(&content_type, body).await {
        Ok(response) => response,
        Err(details) => {
            warn!("calculation workflow unreachable: {details}");
            return with_cors(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({
                        "error": "failed to reach calculation workflow",
                        "details": details,
                    })),
                )
                    .into_response(),
            );
        }
    };

    let status =
        StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !upstream.is_success() {
        let details = excerpt(&upstream.body, state.api.upstream_error_excerpt_max);
        warn!("calculation workflow returned {}: {details}", upstream.status);
        return with_cors(
            (
                status,
                axum::Json(json!({
                    "error": format!("n8n returned error: {}", upstream.status),
                    "details": details,
                })),
            )
                .into_response(),
        );
    }

    // Relay JSON as JSON; anything else goes back as raw text.
    match serde_json::from_str::<Value>(&upstream.body) {
        Ok(parsed) => with_cors((status, axum::Json(parsed)).into_response()),
        Err(_) => with_cors((status, upstream.body).into_response()),
    }
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("*"),
    );
    response
}

fn excerpt(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    let mut cut = max;
    while cut > 0 && !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    raw[..cut].to_string()
}
