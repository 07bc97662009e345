#![forbid(unsafe_code)]

mod dto;
mod error_mapping;
mod errors;

use serde_json::{json, Value};

pub const CRATE_NAME: &str = "verdant-api";
pub const API_VERSION: &str = "v1";

pub use dto::{
    ChatRequestDto, ChatResponseDto, ProfileResponseDto, ProgressResponseDto, RecordsResponseDto,
    ReportResponseDto, ScenarioResponseDto, ScenariosResponseDto, StoredRecordDto, StoredScenarioDto,
    UploadResponseDto,
};
pub use error_mapping::{map_error, ApiErrorMapping, API_ERROR_SCHEMA_REF};
pub use errors::{ApiError, ApiErrorCode};

#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
      "openapi": "3.0.3",
      "info": {
        "title": "verdant API",
        "version": "v1"
      },
      "paths": {
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/readyz": {"get": {"responses": {"200": {"description": "ready"}, "503": {"description": "not ready"}}}},
        "/metrics": {"get": {"responses": {"200": {"description": "plain-text counters"}}}},
        "/calculate-emissions": {
          "post": {
            "requestBody": {"content": {"multipart/form-data": {}}},
            "responses": {
              "200": {"description": "relayed workflow response"},
              "405": {"description": "method not allowed"},
              "500": {"description": "upstream or network failure"}
            }
          },
          "options": {"responses": {"200": {"description": "CORS preflight"}}}
        },
        "/v1/uploads": {
          "post": {
            "requestBody": {"content": {"multipart/form-data": {}}},
            "responses": {
              "200": {"description": "normalized and persisted emissions record"},
              "400": {"description": "invalid upload", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "401": {"description": "missing identity", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}},
              "502": {"description": "workflow unreachable or response unusable", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}}
            }
          }
        },
        "/v1/profile": {
          "get": {"responses": {"200": {"description": "business profile, if saved"}}},
          "put": {"responses": {"200": {"description": "profile upserted"}, "400": {"description": "invalid profile"}}}
        },
        "/v1/records": {"get": {"responses": {"200": {"description": "records ordered by reporting period"}}}},
        "/v1/records/latest": {"get": {"responses": {"200": {"description": "most recently created record"}, "404": {"description": "no records"}}}},
        "/v1/metrics/categories": {"get": {"responses": {"200": {"description": "category breakdown of latest record"}}}},
        "/v1/metrics/scopes": {"get": {"responses": {"200": {"description": "scope breakdown of latest record"}}}},
        "/v1/metrics/yearly": {"get": {"responses": {"200": {"description": "year-over-year aggregation"}}}},
        "/v1/scenarios": {
          "get": {"responses": {"200": {"description": "scenario list"}}},
          "post": {"responses": {"200": {"description": "scenario created"}, "400": {"description": "invalid scenario"}}}
        },
        "/v1/scenarios/{id}": {
          "put": {"responses": {"200": {"description": "scenario updated"}, "404": {"description": "unknown scenario"}}},
          "delete": {"responses": {"200": {"description": "scenario deleted"}, "404": {"description": "unknown scenario"}}}
        },
        "/v1/scenarios/{id}/activate": {
          "post": {"responses": {"200": {"description": "scenario activated; all others deactivated"}, "404": {"description": "unknown scenario"}}}
        },
        "/v1/progress": {"get": {"responses": {"200": {"description": "active scenario progress against latest record"}}}},
        "/v1/reports/{source_file}": {
          "get": {"responses": {"200": {"description": "stored report blob"}, "404": {"description": "no report for file"}}},
          "put": {"responses": {"200": {"description": "report upserted"}}}
        },
        "/v1/chat": {
          "post": {"responses": {"200": {"description": "assistant reply"}, "502": {"description": "chat webhook unreachable"}}}
        },
        "/v1/version": {"get": {"responses": {"200": {"description": "service version"}}}},
        "/v1/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}}
      },
      "components": {
        "schemas": {
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details", "request_id"],
            "properties": {
              "code": {"type": "string"},
              "message": {"type": "string"},
              "details": {},
              "request_id": {"type": "string"}
            }
          }
        }
      }
    })
}
