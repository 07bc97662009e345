// SPDX-License-Identifier: Apache-2.0

use crate::{IsoDate, ParseError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCENARIO_NAME_MAX_LEN: usize = 256;

/// User-authored reduction plan from a baseline emissions total toward a
/// target total. At most one scenario per user carries `is_active`; the
/// store enforces that, not this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub baseline_total: f64,
    pub target_total: f64,
    #[serde(default)]
    pub category_reductions: BTreeMap<String, f64>,
    pub overall_reduction_pct: f64,
    pub timeline_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<IsoDate>,
    #[serde(default)]
    pub is_active: bool,
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.trim().is_empty() {
            return Err(ParseError::Empty("name"));
        }
        if self.name.len() > SCENARIO_NAME_MAX_LEN {
            return Err(ParseError::TooLong("name", SCENARIO_NAME_MAX_LEN));
        }
        if !self.baseline_total.is_finite() || self.baseline_total < 0.0 {
            return Err(ParseError::OutOfRange(
                "baseline_total must be finite and non-negative",
            ));
        }
        if !self.target_total.is_finite() || self.target_total < 0.0 {
            return Err(ParseError::OutOfRange(
                "target_total must be finite and non-negative",
            ));
        }
        if !(0.0..=100.0).contains(&self.overall_reduction_pct) {
            return Err(ParseError::OutOfRange(
                "overall_reduction_pct must be within 0-100",
            ));
        }
        for pct in self.category_reductions.values() {
            if !(0.0..=100.0).contains(pct) {
                return Err(ParseError::OutOfRange(
                    "category reduction percentages must be within 0-100",
                ));
            }
        }
        if self.timeline_months == 0 {
            return Err(ParseError::OutOfRange("timeline_months must be >= 1"));
        }
        Ok(())
    }
}
