// SPDX-License-Identifier: Apache-2.0

use crate::http::identity::require_user;
use crate::http::response_contract::{reject, storage_reject};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use tracing::warn;
use verdant_api::{ApiErrorCode, ChatRequestDto, ChatResponseDto, API_VERSION};
use verdant_store::StoredRecord;

/// Fixed instruction sent with every chat relay; the webhook owns the
/// conversation itself.
pub(crate) const CHAT_SYSTEM_INSTRUCTION: &str = "You are a sustainability assistant for a \
carbon accounting product. Answer questions using the supplied emissions context and figures; \
when the context does not cover a question, say so instead of inventing numbers.";

/// Relay a user message to the chat webhook together with the latest
/// emissions record as context.
pub(crate) async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequestDto>,
) -> Response {
    state.metrics.chat_requests_total.fetch_add(1, Ordering::Relaxed);
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let message = request.message.trim();
    if message.is_empty() {
        return reject(
            ApiErrorCode::ValidationFailed,
            "chat message must not be empty",
            Value::Null,
        );
    }

    let latest = {
        let store = state.store.lock().await;
        match store.latest_record(&user) {
            Ok(latest) => latest,
            Err(e) => return storage_reject(&e),
        }
    };

    let payload = json!({
        "message": message,
        "user_id": user.as_str(),
        "context": context_summary(latest.as_ref()),
        "figures": figures(latest.as_ref()),
        "system": CHAT_SYSTEM_INSTRUCTION,
    });

    let reply = match state.upstream.chat(&payload).await {
        Ok(reply) => reply,
        Err(details) => {
            warn!("chat webhook unreachable: {details}");
            return reject(
                ApiErrorCode::UpstreamUnavailable,
                "failed to reach chat webhook",
                json!({"details": details}),
            );
        }
    };

    match reply.get("response").and_then(Value::as_str) {
        Some(text) => Json(ChatResponseDto {
            api_version: API_VERSION.to_string(),
            response: text.to_string(),
        })
        .into_response(),
        None => reject(
            ApiErrorCode::UpstreamUnavailable,
            "chat webhook returned an unusable response",
            json!({"observed_keys": reply
                .as_object()
                .map(|o| o.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default()}),
        ),
    }
}

fn context_summary(latest: Option<&StoredRecord>) -> String {
    match latest {
        Some(stored) => {
            let r = &stored.record;
            format!(
                "Latest emissions record ({}): total {:.1} kg CO2e; scope 1 {:.1}, scope 2 {:.1}, \
                 scope 3 {:.1}; electricity {:.1}, gas {:.1}, fuel {:.1}, flights {:.1}, \
                 water {:.1}, waste {:.1}. Source file: {}.",
                r.period.label,
                r.total_emissions,
                r.scopes.scope1,
                r.scopes.scope2,
                r.scopes.scope3,
                r.categories.electricity,
                r.categories.gas,
                r.categories.fuel,
                r.categories.flights,
                r.categories.water,
                r.categories.waste,
                r.source_file,
            )
        }
        None => "No emissions records have been uploaded yet.".to_string(),
    }
}

fn figures(latest: Option<&StoredRecord>) -> Value {
    match latest {
        Some(stored) => json!({
            "scope1": stored.record.scopes.scope1,
            "scope2": stored.record.scopes.scope2,
            "scope3": stored.record.scopes.scope3,
            "total": stored.record.total_emissions,
        }),
        None => Value::Null,
    }
}
