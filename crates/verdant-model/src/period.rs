// SPDX-License-Identifier: Apache-2.0

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const PERIOD_LABEL_MAX_LEN: usize = 64;

/// Calendar date in `YYYY-MM-DD` form. Stored and serialized as the raw
/// string; `parse` is the only constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct IsoDate(String);

impl IsoDate {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let bytes = input.as_bytes();
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(ParseError::InvalidFormat("date must be YYYY-MM-DD"));
        }
        for (idx, b) in bytes.iter().enumerate() {
            if idx == 4 || idx == 7 {
                continue;
            }
            if !b.is_ascii_digit() {
                return Err(ParseError::InvalidFormat("date must be YYYY-MM-DD"));
            }
        }
        let month: u8 = input[5..7]
            .parse()
            .map_err(|_| ParseError::InvalidFormat("date must be YYYY-MM-DD"))?;
        let day: u8 = input[8..10]
            .parse()
            .map_err(|_| ParseError::InvalidFormat("date must be YYYY-MM-DD"))?;
        if month == 0 || month > 12 {
            return Err(ParseError::OutOfRange("date month must be 01-12"));
        }
        if day == 0 || day > 31 {
            return Err(ParseError::OutOfRange("date day must be 01-31"));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.0[..4].parse().unwrap_or(0)
    }
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw.to_ascii_uppercase().as_str() {
            "Q1" => Ok(Self::Q1),
            "Q2" => Ok(Self::Q2),
            "Q3" => Ok(Self::Q3),
            "Q4" => Ok(Self::Q4),
            _ => Err(ParseError::InvalidFormat(
                "quarter must be one of Q1, Q2, Q3, Q4",
            )),
        }
    }
}

// Fixed quarter boundary tables; the upload flow derives period dates from
// these, never from the calendar at request time.
const QUARTER_STARTS: [&str; 4] = ["01-01", "04-01", "07-01", "10-01"];
const QUARTER_ENDS: [&str; 4] = ["03-31", "06-30", "09-30", "12-31"];

/// Start and end dates for a `"Q<n> <year>"` label, e.g. `"Q2 2025"`.
/// Labels that are not in quarter form get no dates.
#[must_use]
pub fn quarter_bounds(label: &str) -> Option<(IsoDate, IsoDate)> {
    let (quarter_raw, year_raw) = label.trim().split_once(' ')?;
    let quarter = Quarter::parse(quarter_raw).ok()?;
    let year: u16 = year_raw.trim().parse().ok()?;
    if !(1900..=9999).contains(&year) {
        return None;
    }
    let idx = quarter as usize;
    let start = IsoDate::parse(&format!("{year:04}-{}", QUARTER_STARTS[idx])).ok()?;
    let end = IsoDate::parse(&format!("{year:04}-{}", QUARTER_ENDS[idx])).ok()?;
    Some((start, end))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportingPeriod {
    pub label: String,
    pub start: Option<IsoDate>,
    pub end: Option<IsoDate>,
}

impl ReportingPeriod {
    pub fn new(
        label: impl Into<String>,
        start: Option<IsoDate>,
        end: Option<IsoDate>,
    ) -> Result<Self, ParseError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ParseError::Empty("reporting_period"));
        }
        if label.len() > PERIOD_LABEL_MAX_LEN {
            return Err(ParseError::TooLong("reporting_period", PERIOD_LABEL_MAX_LEN));
        }
        if let (Some(s), Some(e)) = (&start, &end) {
            if s > e {
                return Err(ParseError::OutOfRange("period start must be <= end"));
            }
        }
        Ok(Self { label, start, end })
    }

    /// Quarter labels get their dates filled from the fixed tables; any
    /// other label keeps whatever dates were supplied.
    pub fn from_label(label: impl Into<String>) -> Result<Self, ParseError> {
        let label = label.into();
        let bounds = quarter_bounds(&label);
        match bounds {
            Some((start, end)) => Self::new(label, Some(start), Some(end)),
            None => Self::new(label, None, None),
        }
    }
}
