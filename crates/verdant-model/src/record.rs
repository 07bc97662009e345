// SPDX-License-Identifier: Apache-2.0

use crate::{ParseError, ReportingPeriod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SOURCE_FILE_MAX_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EmissionsCategory {
    Electricity,
    Gas,
    Fuel,
    Flights,
    Water,
    Waste,
}

impl EmissionsCategory {
    pub const ALL: [Self; 6] = [
        Self::Electricity,
        Self::Gas,
        Self::Fuel,
        Self::Flights,
        Self::Water,
        Self::Waste,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
            Self::Fuel => "fuel",
            Self::Flights => "flights",
            Self::Water => "water",
            Self::Waste => "waste",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

impl Scope {
    pub const ALL: [Self; 3] = [Self::Scope1, Self::Scope2, Self::Scope3];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scope1 => "scope_1",
            Self::Scope2 => "scope_2",
            Self::Scope3 => "scope_3",
        }
    }

    /// Display label used by report and chart surfaces.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Scope1 => "Scope 1",
            Self::Scope2 => "Scope 2",
            Self::Scope3 => "Scope 3",
        }
    }
}

/// Per-category emissions, kg CO2e. Absent source values coalesce to zero
/// upstream of this type; the totals themselves must be finite and
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CategoryTotals {
    pub electricity: f64,
    pub gas: f64,
    pub fuel: f64,
    pub flights: f64,
    pub water: f64,
    pub waste: f64,
}

impl CategoryTotals {
    #[must_use]
    pub fn get(&self, category: EmissionsCategory) -> f64 {
        match category {
            EmissionsCategory::Electricity => self.electricity,
            EmissionsCategory::Gas => self.gas,
            EmissionsCategory::Fuel => self.fuel,
            EmissionsCategory::Flights => self.flights,
            EmissionsCategory::Water => self.water,
            EmissionsCategory::Waste => self.waste,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        EmissionsCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        for category in EmissionsCategory::ALL {
            let value = self.get(category);
            if !value.is_finite() || value < 0.0 {
                return Err(ParseError::OutOfRange(
                    "category totals must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScopeTotals {
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
}

impl ScopeTotals {
    #[must_use]
    pub fn get(&self, scope: Scope) -> f64 {
        match scope {
            Scope::Scope1 => self.scope1,
            Scope::Scope2 => self.scope2,
            Scope::Scope3 => self.scope3,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.scope1 + self.scope2 + self.scope3
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        for scope in Scope::ALL {
            let value = self.get(scope);
            if !value.is_finite() || value < 0.0 {
                return Err(ParseError::OutOfRange(
                    "scope totals must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// One calculation run. Insert-only: once persisted a record is never
/// updated or deleted. Cross-consistency of `total_emissions` against the
/// category and scope sums is expected from the calculation workflow but
/// deliberately not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmissionsRecord {
    pub period: ReportingPeriod,
    pub categories: CategoryTotals,
    pub scopes: ScopeTotals,
    pub total_emissions: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_breakdown: Option<BTreeMap<String, f64>>,
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
}

impl EmissionsRecord {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.source_file.trim().is_empty() {
            return Err(ParseError::Empty("source_file"));
        }
        if self.source_file.len() > SOURCE_FILE_MAX_LEN {
            return Err(ParseError::TooLong("source_file", SOURCE_FILE_MAX_LEN));
        }
        if !self.total_emissions.is_finite() || self.total_emissions < 0.0 {
            return Err(ParseError::OutOfRange(
                "total_emissions must be finite and non-negative",
            ));
        }
        self.categories.validate()?;
        self.scopes.validate()?;
        if let Some(sites) = &self.site_breakdown {
            for value in sites.values() {
                if !value.is_finite() {
                    return Err(ParseError::OutOfRange(
                        "site breakdown values must be finite",
                    ));
                }
            }
        }
        Ok(())
    }
}
