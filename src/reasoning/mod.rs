//! Signal-to-insight reasoning pipeline.
//!
//! ## Flow
//!
//! ```text
//! DisparitySignal + OccupancyContext
//!        │
//!        ▼
//!   classifier (threshold snapshot) ──► category + severity
//!        │
//!        ├─► cost (waste watts, kWh, daily/monthly/annual)
//!        ├─► recommend (ranked actions with payback)
//!        └─► confidence (blended diagnosis confidence)
//!        ▼
//!   WasteInsight (immutable)
//! ```
//!
//! Each evaluation is a pure, synchronous computation: the only shared state
//! read is the threshold snapshot, captured once at the start of the call.

pub mod classifier;
pub mod confidence;
pub mod context;
pub mod cost;
pub mod recommend;
pub mod signal;

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::adaptive::ThresholdStore;
use crate::types::{
    DisparitySignal, Explanation, OccupancyContext, OccupancyStatus, SignalStrength, TimePattern,
    WasteCategory, WasteInsight,
};

pub use classifier::{classify, Classification, RuleInput};
pub use context::ContextFields;

/// One device evaluation, already normalized and validated.
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub signal: DisparitySignal,
    pub context: OccupancyContext,
    /// Appliance category, e.g. "hvac", "server", "lighting".
    pub device_category: String,
    /// How long the condition has been observed (hours).
    pub duration_hours: f64,
    /// Per-call tariff override (currency per kWh).
    pub cost_per_kwh: Option<f64>,
}

/// Assembles `WasteInsight`s from normalized inputs.
///
/// Cheap to clone; all evaluations share the same adaptive threshold store.
#[derive(Clone)]
pub struct WasteAnalyzer {
    thresholds: Arc<ThresholdStore>,
}

impl WasteAnalyzer {
    pub fn new(thresholds: Arc<ThresholdStore>) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdStore {
        &self.thresholds
    }

    /// Run the full pipeline for one device evaluation.
    pub fn analyze(&self, input: &EvaluationInput) -> WasteInsight {
        // One snapshot for the whole decision: thresholds never change
        // mid-classification.
        let thresholds = self.thresholds.snapshot();

        let cost_per_kwh = input.cost_per_kwh.unwrap_or_else(cfg_cost_per_kwh);
        let projected_daily_cost =
            input.signal.magnitude_w / 1000.0 * 24.0 * cost_per_kwh;

        let classification = classifier::classify(&RuleInput {
            signal: &input.signal,
            context: &input.context,
            duration_hours: input.duration_hours,
            thresholds: thresholds.as_ref(),
            projected_daily_cost,
            post_occupancy_daily_cost_high: cfg_post_occupancy_daily_cost_high(),
        });

        let waste_power = cost::estimated_waste_power_w(
            classification.category,
            input.signal.magnitude_w,
            cfg_inefficient_fraction(),
        );
        let cost = cost::cost_impact(waste_power, cost_per_kwh);
        let total_wasted_kwh = cost::total_wasted_kwh(waste_power, input.duration_hours);

        let actions = recommend::actions_for(
            classification.category,
            classification.severity,
            &input.device_category,
            cost.annual,
        );

        let confidence = confidence::score(
            input.signal.confidence,
            input.context.status_confidence,
            classification.severity,
        );

        let explanation = Explanation {
            occupancy_mismatch: classification.occupancy_mismatch,
            time_pattern: time_pattern(&input.context, classification.occupancy_mismatch),
            signal_strength: signal_strength(&input.signal),
            reasoning: reasoning_chain(input, &classification),
        };

        debug!(
            category = %classification.category,
            severity = %classification.severity,
            magnitude_w = input.signal.magnitude_w,
            daily_cost = cost.daily,
            "evaluated device signal"
        );

        WasteInsight {
            category: classification.category,
            severity: classification.severity,
            power_disparity_w: input.signal.magnitude_w,
            estimated_waste_power_w: waste_power,
            duration_hours: input.duration_hours,
            total_wasted_kwh,
            cost,
            cost_per_kwh,
            explanation,
            actions,
            confidence,
            detected_at: Utc::now(),
        }
    }
}

/// Bucket the raw signal for explainability.
pub(crate) fn signal_strength(signal: &DisparitySignal) -> SignalStrength {
    if signal.magnitude_w < 100.0 || signal.confidence < 0.6 {
        SignalStrength::Weak
    } else if signal.magnitude_w > 500.0 && signal.confidence > 0.85 {
        SignalStrength::Strong
    } else {
        SignalStrength::Moderate
    }
}

/// Temporal pattern of the flagged condition.
pub(crate) fn time_pattern(context: &OccupancyContext, occupancy_mismatch: bool) -> TimePattern {
    if context.is_night_hours() {
        TimePattern::NightHours
    } else if context.is_working_hours() {
        TimePattern::WorkingHours
    } else if occupancy_mismatch {
        TimePattern::AfterOccupancy
    } else {
        TimePattern::Unclassified
    }
}

/// One sentence per contributing fact, in evaluation order. Facts are only
/// emitted for rules that actually held.
fn reasoning_chain(input: &EvaluationInput, classification: &Classification) -> Vec<String> {
    let mut chain = Vec::new();

    chain.push(format!(
        "Model detected {:.0}W power deviation (confidence {:.0}%)",
        input.signal.magnitude_w,
        input.signal.confidence * 100.0
    ));

    match input.context.status {
        OccupancyStatus::Unoccupied => chain.push("Zone is unoccupied at this time".to_string()),
        OccupancyStatus::Occupied => chain.push("Zone is occupied".to_string()),
        OccupancyStatus::Unknown => {
            chain.push("Occupancy state is unknown; stricter evidence applied".to_string());
        }
    }

    if input.context.is_night_hours() {
        chain.push("Deviation occurs during off-hours (10 PM - 6 AM)".to_string());
    } else if input.context.is_working_hours() {
        chain.push("Deviation occurs during working hours (9 AM - 6 PM)".to_string());
    }

    match classification.category {
        WasteCategory::PhantomLoad => chain.push(
            "Sustained high draw during unoccupancy indicates a phantom load".to_string(),
        ),
        WasteCategory::PostOccupancy => chain.push(
            "Equipment continues running after occupancy ended".to_string(),
        ),
        WasteCategory::InefficientUsage => chain.push(
            "Unusual power variance during occupancy indicates inefficient operation".to_string(),
        ),
        WasteCategory::Normal => {}
    }

    if classification.category.is_waste() {
        chain.push(format!(
            "Condition sustained for {:.1} hours",
            input.duration_hours
        ));
    }

    chain
}



// ============================================================================
// Config-aware accessors (fall back to defaults when config isn't loaded,
// e.g. in unit tests)
// ============================================================================

fn cfg_cost_per_kwh() -> f64 {
    if crate::config::is_initialized() {
        crate::config::get().tariff.cost_per_kwh
    } else {
        8.0
    }
}

fn cfg_inefficient_fraction() -> f64 {
    if crate::config::is_initialized() {
        crate::config::get().classifier.inefficient_attribution_fraction
    } else {
        0.6
    }
}

fn cfg_post_occupancy_daily_cost_high() -> f64 {
    if crate::config::is_initialized() {
        crate::config::get().classifier.post_occupancy_daily_cost_high
    } else {
        crate::types::thresholds::waste_thresholds::POST_OCCUPANCY_DAILY_COST_HIGH
    }
}
