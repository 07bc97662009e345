// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tracing::{info, warn};
use verdant_api::{ApiErrorCode, StoredRecordDto, UploadResponseDto, API_VERSION};
use verdant_core::sha256_hex;
use verdant_ingest::{normalize_workflow_response, UploadFields};
use verdant_model::ReportingPeriod;

struct UploadParts {
    file_bytes: Vec<u8>,
    filename: String,
    content_type: String,
    reporting_period: Option<String>,
}

/// The upload flow end to end: relay the spreadsheet to the calculation
/// workflow, normalize whatever shape comes back, persist the record, and
/// return it. The record is only written after a usable workflow response;
/// a failure at any step persists nothing.
pub(crate) async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    state.metrics.uploads_total.fetch_add(1, Ordering::Relaxed);
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if state.api.enable_rate_limit
        && !state
            .upload_limiter
            .allow(user.as_str(), &state.api.rate_limit_per_ip)
            .await
    {
        state.metrics.rate_limited_total.fetch_add(1, Ordering::Relaxed);
        return reject(ApiErrorCode::RateLimited, "too many uploads", Value::Null);
    }

    let parts = match read_multipart(multipart).await {
        Ok(parts) => parts,
        Err(response) => {
            state
                .metrics
                .upload_failures_total
                .fetch_add(1, Ordering::Relaxed);
            return *response;
        }
    };

    match run_upload(&state, &user, parts).await {
        Ok(response) => response,
        Err(response) => {
            state
                .metrics
                .upload_failures_total
                .fetch_add(1, Ordering::Relaxed);
            *response
        }
    }
}

async fn run_upload(
    state: &AppState,
    user: &verdant_model::UserId,
    parts: UploadParts,
) -> Result<Response, Box<Response>> {
    let digest = sha256_hex(&parts.file_bytes);
    let fields = UploadFields::new(
        user.clone(),
        parts.filename.clone(),
        parts.reporting_period.clone(),
    );

    let upstream = state
        .upstream
        .calculate_multipart(&fields, parts.file_bytes, &parts.content_type)
        .await
        .map_err(|details| {
            warn!("calculation workflow unreachable: {details}");
            Box::new(reject(
                ApiErrorCode::UpstreamUnavailable,
                "failed to reach calculation workflow",
                json!({"details": details}),
            ))
        })?;

    if !upstream.is_success() {
        let details = truncate(&upstream.body, state.api.upstream_error_excerpt_max);
        warn!(
            "calculation workflow returned {}: {details}",
            upstream.status
        );
        return Err(Box::new(reject(
            ApiErrorCode::UpstreamUnavailable,
            &format!("n8n returned error: {}", upstream.status),
            json!({"details": details}),
        )));
    }

    let normalized = normalize_workflow_response(&upstream.body).map_err(|e| {
        warn!("workflow response failed normalization: {e}");
        Box::new(reject(
            ApiErrorCode::WorkflowResponseInvalid,
            "calculation workflow returned an unusable response",
            json!({"details": e.to_string()}),
        ))
    })?;

    // The caller-supplied period wins; a period echoed by the workflow is
    // only used when the form carried none.
    let period = if parts.reporting_period.is_none() {
        match &normalized.reporting_period {
            Some(label) => ReportingPeriod::from_label(label.clone())
                .unwrap_or_else(|_| fields.record_period()),
            None => fields.record_period(),
        }
    } else {
        fields.record_period()
    };

    let record = normalized
        .into_record(period, parts.filename.clone(), Some(digest))
        .map_err(|e| {
            warn!("normalized record rejected: {e}");
            Box::new(reject(
                ApiErrorCode::WorkflowResponseInvalid,
                "calculation workflow returned an unusable response",
                json!({"details": e.to_string()}),
            ))
        })?;

    let stored = {
        let store = state.store.lock().await;
        store.insert_record(user, &record)
    }
    .map_err(|e| Box::new(storage_reject(&e)))?;

    info!(
        "persisted emissions record {} for {} ({})",
        stored.id,
        user.as_str(),
        stored.record.source_file
    );
    Ok(Json(UploadResponseDto {
        api_version: API_VERSION.to_string(),
        record: StoredRecordDto {
            id: stored.id,
            created_at: stored.created_at,
            record: stored.record,
        },
    })
    .into_response())
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadParts, Box<Response>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename = String::new();
    let mut content_type = "application/octet-stream".to_string();
    let mut reporting_period: Option<String> = None;

    loop {
        let field = multipart.next_field().await.map_err(|e| {
            Box::new(reject(
                ApiErrorCode::ValidationFailed,
                "malformed multipart body",
                json!({"details": e.to_string()}),
            ))
        })?;
        let Some(field) = field else { break };
        match field.name().unwrap_or_default() {
            "file" => {
                filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "upload.xlsx".to_string());
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                let bytes = field.bytes().await.map_err(|e| {
                    Box::new(reject(
                        ApiErrorCode::ValidationFailed,
                        "failed to read uploaded file",
                        json!({"details": e.to_string()}),
                    ))
                })?;
                file_bytes = Some(bytes.to_vec());
            }
            "reporting_period" => {
                let text = field.text().await.unwrap_or_default();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    reporting_period = Some(trimmed.to_string());
                }
            }
            // Clients may still send user_id/filename fields; identity
            // comes from the header and the filename from the part.
            _ => {}
        }
    }

    let file_bytes = file_bytes.ok_or_else(|| {
        Box::new(reject(
            ApiErrorCode::ValidationFailed,
            "upload requires a 'file' field",
            Value::Null,
        ))
    })?;
    if file_bytes.is_empty() {
        return Err(Box::new(reject(
            ApiErrorCode::ValidationFailed,
            "uploaded file is empty",
            Value::Null,
        )));
    }

    Ok(UploadParts {
        file_bytes,
        filename,
        content_type,
        reporting_period,
    })
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    let mut cut = max;
    while cut > 0 && !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    raw[..cut].to_string()
}
