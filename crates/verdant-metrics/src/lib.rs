// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod breakdown;
mod progress;
mod yearly;

pub const CRATE_NAME: &str = "verdant-metrics";

pub use breakdown::{category_breakdown, scope_breakdown, ChartSlice};
pub use progress::{
    expected_total, scenario_progress, track_status, ScenarioProgress, TrackStatus,
    TRACK_VARIANCE_PCT,
};
pub use yearly::{aggregate_by_year, UnassignedBucket, YearGroup, YearlyAggregation};
