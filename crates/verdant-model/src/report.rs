// SPDX-License-Identifier: Apache-2.0

use crate::record::SOURCE_FILE_MAX_LEN;
use crate::ParseError;
use serde::{Deserialize, Serialize};

/// Opaque pre-rendered report markup keyed by the upload's source filename.
/// The application never interprets the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserReport {
    pub source_file: String,
    pub body: String,
}

impl UserReport {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.source_file.trim().is_empty() {
            return Err(ParseError::Empty("source_file"));
        }
        if self.source_file.len() > SOURCE_FILE_MAX_LEN {
            return Err(ParseError::TooLong("source_file", SOURCE_FILE_MAX_LEN));
        }
        Ok(())
    }
}
