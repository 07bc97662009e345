// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use verdant_model::Scenario;

/// Variance band, in percent of the expected value, separating ahead /
/// on-track / off-track.
pub const TRACK_VARIANCE_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TrackStatus {
    Ahead,
    OnTrack,
    OffTrack,
}

/// Progress of current emissions from a scenario's baseline toward its
/// target, as a percentage clamped to 0..=100.
///
/// A scenario whose baseline equals its target has no distance to cover:
/// progress is 100 once current emissions have reached the target and 0
/// while they have not. The result is never NaN or infinite.
#[must_use]
pub fn scenario_progress(baseline: f64, target: f64, current: f64) -> f64 {
    let span = baseline - target;
    if span == 0.0 || !span.is_finite() {
        return if current <= target { 100.0 } else { 0.0 };
    }
    let raw = (baseline - current) / span * 100.0;
    if !raw.is_finite() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

/// Where current emissions are expected to be under the scenario's overall
/// reduction percentage.
#[must_use]
pub fn expected_total(baseline: f64, reduction_pct: f64) -> f64 {
    baseline * (1.0 - reduction_pct / 100.0)
}

/// Classify current emissions against the expected value with a
/// [`TRACK_VARIANCE_PCT`] band on either side.
#[must_use]
pub fn track_status(current: f64, expected: f64) -> TrackStatus {
    if expected <= 0.0 {
        return if current <= 0.0 {
            TrackStatus::OnTrack
        } else {
            TrackStatus::OffTrack
        };
    }
    let variance = (current - expected) / expected * 100.0;
    if variance < -TRACK_VARIANCE_PCT {
        TrackStatus::Ahead
    } else if variance > TRACK_VARIANCE_PCT {
        TrackStatus::OffTrack
    } else {
        TrackStatus::OnTrack
    }
}

/// The full progress readout for the active scenario against the latest
/// emissions record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioProgress {
    pub scenario_name: String,
    pub baseline_total: f64,
    pub target_total: f64,
    pub current_total: f64,
    pub expected_total: f64,
    pub progress_pct: f64,
    pub status: TrackStatus,
}

impl ScenarioProgress {
    #[must_use]
    pub fn compute(scenario: &Scenario, current_total: f64) -> Self {
        let expected = expected_total(scenario.baseline_total, scenario.overall_reduction_pct);
        Self {
            scenario_name: scenario.name.clone(),
            baseline_total: scenario.baseline_total,
            target_total: scenario.target_total,
            current_total,
            expected_total: expected,
            progress_pct: scenario_progress(
                scenario.baseline_total,
                scenario.target_total,
                current_total,
            ),
            status: track_status(current_total, expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_to_the_baseline_target_span() {
        assert_eq!(scenario_progress(224.0, 180.0, 224.0), 0.0);
        assert_eq!(scenario_progress(224.0, 180.0, 180.0), 100.0);
        assert_eq!(scenario_progress(224.0, 180.0, 202.0), 50.0);
        // Regression past the baseline clamps to 0, never negative.
        assert_eq!(scenario_progress(224.0, 180.0, 260.0), 0.0);
        // Overshoot past the target clamps to 100.
        assert_eq!(scenario_progress(224.0, 180.0, 150.0), 100.0);
    }

    #[test]
    fn equal_baseline_and_target_never_yields_nan() {
        assert_eq!(scenario_progress(200.0, 200.0, 200.0), 100.0);
        assert_eq!(scenario_progress(200.0, 200.0, 199.0), 100.0);
        assert_eq!(scenario_progress(200.0, 200.0, 210.0), 0.0);
    }

    #[test]
    fn track_status_uses_a_five_percent_band() {
        // expected = 100
        assert_eq!(track_status(94.9, 100.0), TrackStatus::Ahead);
        assert_eq!(track_status(95.1, 100.0), TrackStatus::OnTrack);
        assert_eq!(track_status(100.0, 100.0), TrackStatus::OnTrack);
        assert_eq!(track_status(104.9, 100.0), TrackStatus::OnTrack);
        assert_eq!(track_status(105.1, 100.0), TrackStatus::OffTrack);
    }

    #[test]
    fn zero_expected_value_is_defined() {
        assert_eq!(track_status(0.0, 0.0), TrackStatus::OnTrack);
        assert_eq!(track_status(5.0, 0.0), TrackStatus::OffTrack);
    }

    #[test]
    fn compute_assembles_the_full_readout() {
        let scenario = Scenario {
            name: "Fleet electrification".to_string(),
            description: None,
            baseline_total: 224.0,
            target_total: 180.0,
            category_reductions: Default::default(),
            overall_reduction_pct: 20.0,
            timeline_months: 18,
            target_date: None,
            is_active: true,
        };
        let progress = ScenarioProgress::compute(&scenario, 202.0);
        assert_eq!(progress.progress_pct, 50.0);
        assert!((progress.expected_total - 179.2).abs() < 1e-9);
        // 202 vs expected 179.2 is more than 5% over: off track.
        assert_eq!(progress.status, TrackStatus::OffTrack);
    }
}
