// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use verdant_model::{BusinessProfile, EmissionsRecord, Scenario, UserReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredRecordDto {
    pub id: i64,
    pub created_at: String,
    pub record: EmissionsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordsResponseDto {
    pub api_version: String,
    pub records: Vec<StoredRecordDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadResponseDto {
    pub api_version: String,
    pub record: StoredRecordDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileResponseDto {
    pub api_version: String,
    pub profile: Option<BusinessProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredScenarioDto {
    pub id: i64,
    pub scenario: Scenario,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenariosResponseDto {
    pub api_version: String,
    pub scenarios: Vec<StoredScenarioDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioResponseDto {
    pub api_version: String,
    pub scenario: StoredScenarioDto,
}

/// Progress payload is the metrics crate's output serialized verbatim;
/// `progress` is null when the user has no active scenario or no records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressResponseDto {
    pub api_version: String,
    pub progress: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportResponseDto {
    pub api_version: String,
    pub report: UserReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatRequestDto {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatResponseDto {
    pub api_version: String,
    pub response: String,
}
