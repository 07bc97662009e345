// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::ValidationFailed => 400,
        ApiErrorCode::Unauthenticated => 401,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::MethodNotAllowed => 405,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::RateLimited => 429,
        ApiErrorCode::WorkflowResponseInvalid | ApiErrorCode::UpstreamUnavailable => 502,
        _ => 500,
    };

    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn error_codes_map_to_expected_statuses() {
        let cases = [
            (ApiErrorCode::ValidationFailed, 400),
            (ApiErrorCode::Unauthenticated, 401),
            (ApiErrorCode::NotFound, 404),
            (ApiErrorCode::MethodNotAllowed, 405),
            (ApiErrorCode::RateLimited, 429),
            (ApiErrorCode::WorkflowResponseInvalid, 502),
            (ApiErrorCode::UpstreamUnavailable, 502),
            (ApiErrorCode::StorageFailure, 500),
            (ApiErrorCode::Internal, 500),
        ];
        for (code, status) in cases {
            let err = ApiError::new(code, "x", Value::Null, "req-1");
            assert_eq!(map_error(&err).status_code, status, "{code:?}");
        }
    }
}
