// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    Unauthenticated,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    RateLimited,
    WorkflowResponseInvalid,
    UpstreamUnavailable,
    StorageFailure,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::PayloadTooLarge => "payload_too_large",
            Self::RateLimited => "rate_limited",
            Self::WorkflowResponseInvalid => "workflow_response_invalid",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::StorageFailure => "storage_failure",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"reason": reason}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(
            ApiErrorCode::Unauthenticated,
            "missing or invalid x-user-id header",
            Value::Null,
            "req-unknown",
        )
    }

    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            format!("{entity} not found"),
            json!({"entity": entity}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn storage_failure() -> Self {
        Self::new(
            ApiErrorCode::StorageFailure,
            "storage operation failed, please try again",
            Value::Null,
            "req-unknown",
        )
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_as_snake_case() {
        let encoded = serde_json::to_string(&ApiErrorCode::WorkflowResponseInvalid).expect("encode");
        assert_eq!(encoded, "\"workflow_response_invalid\"");
        assert_eq!(
            ApiErrorCode::WorkflowResponseInvalid.as_str(),
            "workflow_response_invalid"
        );
    }

    #[test]
    fn constructors_fill_the_standard_envelope() {
        let err = ApiError::validation_failed("name must not be empty");
        assert_eq!(err.code, ApiErrorCode::ValidationFailed);
        assert_eq!(err.details["reason"], "name must not be empty");

        let err = ApiError::unauthenticated();
        assert_eq!(err.code, ApiErrorCode::Unauthenticated);

        let err = ApiError::not_found("scenario");
        assert_eq!(err.code, ApiErrorCode::NotFound);
        assert_eq!(err.message, "scenario not found");

        let err = ApiError::storage_failure();
        assert_eq!(err.code, ApiErrorCode::StorageFailure);
        assert!(err.message.contains("try again"));
    }
}
