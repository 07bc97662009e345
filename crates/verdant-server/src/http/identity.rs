// SPDX-License-Identifier: Apache-2.0

use crate::http::response_contract::reject;
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::Value;
use verdant_api::ApiErrorCode;
use verdant_model::UserId;

/// The authentication provider sits in front of this service; the gateway
/// injects the authenticated user identifier as `x-user-id`. Requests
/// without it never reach a store or upstream call.
pub(crate) fn require_user(headers: &HeaderMap) -> Result<UserId, Response> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();
    UserId::parse(raw).map_err(|_| {
        reject(
            ApiErrorCode::Unauthenticated,
            "missing or invalid x-user-id header",
            Value::Null,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn accepts_a_plain_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("user-1"));
        assert_eq!(require_user(&headers).expect("user").as_str(), "user-1");
    }

    #[test]
    fn rejects_absent_or_blank_identity() {
        assert!(require_user(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("   "));
        assert!(require_user(&headers).is_err());
    }
}
