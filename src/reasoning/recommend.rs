//! Recommendation generator — (category, severity) to ranked actions.
//!
//! The catalogue is a static lookup table, not branching logic: adding an
//! action for a category is a data change. Payback is formula-derived from
//! the alert's annual cost; free actions always show payback 0.

use crate::types::{ActionPriority, RecommendedAction, Severity, WasteCategory};

/// One catalogue entry. The description template interpolates the device
/// category at `{}`.
struct ActionTemplate {
    priority: ActionPriority,
    description: &'static str,
    estimated_cost: f64,
    confidence: f64,
}

const PHANTOM_ACTIONS: &[ActionTemplate] = &[
    ActionTemplate {
        priority: ActionPriority::Critical,
        description: "Install smart power strip or occupancy-based disconnect for {}",
        estimated_cost: 3000.0,
        confidence: 0.95,
    },
    ActionTemplate {
        priority: ActionPriority::High,
        description: "Enable sleep/idle mode on {} with 15-min shutdown timer",
        estimated_cost: 0.0,
        confidence: 0.90,
    },
    ActionTemplate {
        priority: ActionPriority::Medium,
        description: "Add sub-metering to monitor phantom loads in real time",
        estimated_cost: 15000.0,
        confidence: 0.80,
    },
];

const POST_OCCUPANCY_ACTIONS: &[ActionTemplate] = &[
    ActionTemplate {
        priority: ActionPriority::High,
        description: "Install occupancy sensor-based auto-shutoff for {} (15-min delay)",
        estimated_cost: 2500.0,
        confidence: 0.92,
    },
    ActionTemplate {
        priority: ActionPriority::Medium,
        description: "Train staff on manual shutdown protocols after occupancy ends",
        estimated_cost: 1000.0,
        confidence: 0.85,
    },
    ActionTemplate {
        priority: ActionPriority::Low,
        description: "Install LED retrofit with daylight harvesting in the zone",
        estimated_cost: 8000.0,
        confidence: 0.75,
    },
];

const INEFFICIENT_ACTIONS: &[ActionTemplate] = &[
    ActionTemplate {
        priority: ActionPriority::High,
        description: "Optimize {} operating schedule and setpoints",
        estimated_cost: 2000.0,
        confidence: 0.88,
    },
    ActionTemplate {
        priority: ActionPriority::Medium,
        description: "Conduct an energy audit to identify the inefficiency root cause",
        estimated_cost: 5000.0,
        confidence: 0.80,
    },
];

/// At most this many actions per insight.
const MAX_ACTIONS: usize = 3;

fn catalogue(category: WasteCategory) -> &'static [ActionTemplate] {
    match category {
        WasteCategory::PhantomLoad => PHANTOM_ACTIONS,
        WasteCategory::PostOccupancy => POST_OCCUPANCY_ACTIONS,
        WasteCategory::InefficientUsage => INEFFICIENT_ACTIONS,
        WasteCategory::Normal => &[],
    }
}

/// Days for the avoided annual cost to repay the upfront cost.
fn payback_days(estimated_cost: f64, annual_cost: f64) -> f64 {
    if estimated_cost <= 0.0 || annual_cost <= 0.0 {
        0.0
    } else {
        estimated_cost / (annual_cost / 365.0)
    }
}

/// Generate the ranked action list for one diagnosis.
///
/// A Critical diagnosis promotes the lead action to CRITICAL priority so the
/// most effective fix always sorts first. Output is ordered CRITICAL → HIGH
/// → MEDIUM → LOW and truncated to the top entries; empty for Normal.
pub fn actions_for(
    category: WasteCategory,
    severity: Severity,
    device_category: &str,
    annual_cost: f64,
) -> Vec<RecommendedAction> {
    let mut actions: Vec<RecommendedAction> = catalogue(category)
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let priority = if i == 0 && severity == Severity::Critical {
                ActionPriority::Critical
            } else {
                template.priority
            };
            RecommendedAction {
                priority,
                description: template.description.replace("{}", device_category),
                estimated_cost: template.estimated_cost,
                payback_days: payback_days(template.estimated_cost, annual_cost),
                confidence: template.confidence,
            }
        })
        .collect();

    actions.sort_by_key(|a| a.priority);
    actions.truncate(MAX_ACTIONS);
    actions
}
