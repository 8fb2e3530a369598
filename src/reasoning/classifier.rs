//! Waste classifier — ordered predicate rules over signal + context.
//!
//! The priority order is an explicit rule table rather than inline control
//! flow: reordering or adding a category is a data change. First match wins
//! and no category is evaluated twice per call. All thresholds come from the
//! `ThresholdConfig` snapshot captured by the caller, so the function is
//! referentially transparent given that snapshot.

use crate::types::thresholds::waste_thresholds;
use crate::types::{
    DisparitySignal, OccupancyContext, OccupancyStatus, Severity, ThresholdConfig, WasteCategory,
};

/// Everything a rule predicate may look at.
pub struct RuleInput<'a> {
    pub signal: &'a DisparitySignal,
    pub context: &'a OccupancyContext,
    pub duration_hours: f64,
    pub thresholds: &'a ThresholdConfig,
    /// Projected daily cost at full-magnitude waste (currency units),
    /// used only for severity escalation.
    pub projected_daily_cost: f64,
    /// Daily cost above which post-occupancy waste escalates to High.
    pub post_occupancy_daily_cost_high: f64,
}

/// Classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: WasteCategory,
    pub severity: Severity,
    /// Power drawn while the zone is (believed) unoccupied.
    pub occupancy_mismatch: bool,
}

type Predicate = fn(&RuleInput<'_>) -> bool;

/// Priority-ordered rules. The fallthrough is `Normal`.
const RULES: &[(WasteCategory, Predicate)] = &[
    (WasteCategory::PhantomLoad, phantom_load_applies),
    (WasteCategory::PostOccupancy, post_occupancy_applies),
    (WasteCategory::InefficientUsage, inefficient_usage_applies),
];

/// Classify one evaluation. Pure; exactly one category is returned.
pub fn classify(input: &RuleInput<'_>) -> Classification {
    for (category, applies) in RULES {
        if applies(input) {
            return Classification {
                category: *category,
                severity: severity_for(*category, input),
                occupancy_mismatch: matches!(
                    category,
                    WasteCategory::PhantomLoad | WasteCategory::PostOccupancy
                ),
            };
        }
    }
    Classification {
        category: WasteCategory::Normal,
        severity: Severity::Low,
        occupancy_mismatch: false,
    }
}

/// Sustained high draw in an unoccupied zone.
fn phantom_load_applies(input: &RuleInput<'_>) -> bool {
    input.signal.magnitude_w > input.thresholds.phantom_load_w_threshold
        && input.context.status == OccupancyStatus::Unoccupied
        && input.duration_hours > input.thresholds.min_duration_hours(WasteCategory::PhantomLoad)
}

/// Equipment still drawing after the evening occupancy transition.
/// Duration bound is inclusive.
fn post_occupancy_applies(input: &RuleInput<'_>) -> bool {
    input.signal.magnitude_w > input.thresholds.post_occupancy_w_threshold
        && input.context.hour > 18
        && input.context.status == OccupancyStatus::Unoccupied
        && input.duration_hours
            >= input.thresholds.min_duration_hours(WasteCategory::PostOccupancy)
}

/// Moderate deviation during occupied working hours. Inclusive on the lower
/// bound, exclusive on the upper so band-edge values classify exactly once.
fn inefficient_usage_applies(input: &RuleInput<'_>) -> bool {
    let m = input.signal.magnitude_w;
    m >= input.thresholds.inefficient_w_lower
        && m < input.thresholds.inefficient_w_upper
        && input.context.status == OccupancyStatus::Occupied
        && input.context.is_working_hours()
        && input.duration_hours
            >= input.thresholds.min_duration_hours(WasteCategory::InefficientUsage)
}

fn severity_for(category: WasteCategory, input: &RuleInput<'_>) -> Severity {
    match category {
        WasteCategory::PhantomLoad => {
            let critical = input.signal.magnitude_w
                > 2.0 * input.thresholds.phantom_load_w_threshold
                || input.duration_hours >= waste_thresholds::PHANTOM_CRITICAL_DURATION_HOURS;
            if critical {
                Severity::Critical
            } else {
                Severity::High
            }
        }
        WasteCategory::PostOccupancy => {
            if input.projected_daily_cost > input.post_occupancy_daily_cost_high {
                Severity::High
            } else {
                Severity::Medium
            }
        }
        WasteCategory::InefficientUsage => {
            // Scales with magnitude: Low below the band midpoint, Medium at
            // or above it.
            let midpoint =
                (input.thresholds.inefficient_w_lower + input.thresholds.inefficient_w_upper) / 2.0;
            if input.signal.magnitude_w >= midpoint {
                Severity::Medium
            } else {
                Severity::Low
            }
        }
        WasteCategory::Normal => Severity::Low,
    }
}
