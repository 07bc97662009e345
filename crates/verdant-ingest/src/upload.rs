// SPDX-License-Identifier: Apache-2.0

use verdant_model::{quarter_bounds, IsoDate, ReportingPeriod, UserId};

/// Multipart field name carrying the spreadsheet itself.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// The non-file multipart fields forwarded to the calculation workflow.
/// Quarter labels get `period_start`/`period_end` derived from the fixed
/// quarter tables; other labels are forwarded without dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFields {
    pub user_id: UserId,
    pub filename: String,
    pub reporting_period: Option<String>,
    pub period_start: Option<IsoDate>,
    pub period_end: Option<IsoDate>,
}

impl UploadFields {
    #[must_use]
    pub fn new(user_id: UserId, filename: String, reporting_period: Option<String>) -> Self {
        let bounds = reporting_period.as_deref().and_then(quarter_bounds);
        let (period_start, period_end) = match bounds {
            Some((start, end)) => (Some(start), Some(end)),
            None => (None, None),
        };
        Self {
            user_id,
            filename,
            reporting_period,
            period_start,
            period_end,
        }
    }

    /// Field name/value pairs in forwarding order, file excluded.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("user_id", self.user_id.as_str().to_string()),
            ("filename", self.filename.clone()),
        ];
        if let Some(period) = &self.reporting_period {
            fields.push(("reporting_period", period.clone()));
        }
        if let Some(start) = &self.period_start {
            fields.push(("period_start", start.as_str().to_string()));
        }
        if let Some(end) = &self.period_end {
            fields.push(("period_end", end.as_str().to_string()));
        }
        fields
    }

    /// The reporting period under which the resulting record is persisted.
    /// Falls back to the source filename when no label was supplied, so a
    /// record always has a period label.
    #[must_use]
    pub fn record_period(&self) -> ReportingPeriod {
        let label = self
            .reporting_period
            .clone()
            .unwrap_or_else(|| self.filename.clone());
        ReportingPeriod::new(
            label,
            self.period_start.clone(),
            self.period_end.clone(),
        )
        .unwrap_or_else(|_| ReportingPeriod {
            label: "unlabeled".to_string(),
            start: None,
            end: None,
        })
    }
}
