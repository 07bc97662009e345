// SPDX-License-Identifier: Apache-2.0

use crate::ParseError;
use serde::{Deserialize, Serialize};

pub const COMPANY_NAME_MAX_LEN: usize = 256;

/// Business identity and operating context, one per user. Saved as an
/// upsert; never deleted by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BusinessProfile {
    pub company_name: String,
    pub industry: String,
    pub employee_count: u64,
    pub site_count: u64,
    pub energy_sources: Vec<String>,
    pub fleet_description: String,
    pub sustainability_initiatives: Vec<String>,
    pub reduction_target: String,
    pub budget_posture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_reference: Option<String>,
}

impl BusinessProfile {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.company_name.trim().is_empty() {
            return Err(ParseError::Empty("company_name"));
        }
        if self.company_name.len() > COMPANY_NAME_MAX_LEN {
            return Err(ParseError::TooLong("company_name", COMPANY_NAME_MAX_LEN));
        }
        Ok(())
    }
}
