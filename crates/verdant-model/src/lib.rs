// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod period;
mod profile;
mod record;
mod report;
mod scenario;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "verdant-model";

pub use period::{quarter_bounds, IsoDate, Quarter, ReportingPeriod};
pub use profile::BusinessProfile;
pub use record::{CategoryTotals, EmissionsCategory, EmissionsRecord, Scope, ScopeTotals};
pub use report::UserReport;
pub use scenario::Scenario;

pub const USER_ID_MAX_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    OutOfRange(&'static str),
    InvalidFormat(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::OutOfRange(msg) => f.write_str(msg),
            Self::InvalidFormat(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct UserId(String);

impl UserId {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("user_id"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("user_id"));
        }
        if input.len() > USER_ID_MAX_LEN {
            return Err(ParseError::TooLong("user_id", USER_ID_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
