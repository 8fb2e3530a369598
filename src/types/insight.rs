//! Waste diagnosis types: category, severity, cost impact, recommended
//! actions, and the assembled `WasteInsight`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Energy waste classification. Exactly one per insight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WasteCategory {
    /// Sustained draw while the zone is unoccupied (24/7 waste).
    PhantomLoad,
    /// Draw continuing after occupants leave for the evening.
    PostOccupancy,
    /// Moderate occupied-time deviation from suboptimal operation.
    InefficientUsage,
    Normal,
}

impl WasteCategory {
    pub fn is_waste(self) -> bool {
        self != WasteCategory::Normal
    }

    /// All categories in classifier priority order.
    pub const ALL: [WasteCategory; 4] = [
        WasteCategory::PhantomLoad,
        WasteCategory::PostOccupancy,
        WasteCategory::InefficientUsage,
        WasteCategory::Normal,
    ];
}

impl std::fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WasteCategory::PhantomLoad => write!(f, "phantom_load"),
            WasteCategory::PostOccupancy => write!(f, "post_occupancy"),
            WasteCategory::InefficientUsage => write!(f, "inefficient_usage"),
            WasteCategory::Normal => write!(f, "normal"),
        }
    }
}

/// Diagnosis severity, ordered Low < Medium < High < Critical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl Severity {
    /// Contribution to the diagnosis confidence score.
    pub fn confidence_bonus(self) -> f64 {
        match self {
            Severity::Low => 0.0,
            Severity::Medium => 0.25,
            Severity::High => 0.5,
            Severity::Critical => 1.0,
        }
    }

    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Low
    }
}

/// Monetary impact of a leak. Monthly and annual figures are exact
/// multiples of the daily figure (30x / 365x), never independently
/// estimated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CostImpact {
    pub daily: f64,
    pub monthly: f64,
    pub annual: f64,
}

impl CostImpact {
    /// Build from a daily loss figure.
    pub fn from_daily(daily: f64) -> Self {
        Self {
            daily,
            monthly: daily * 30.0,
            annual: daily * 365.0,
        }
    }
}

/// Remediation action priority, CRITICAL first in any ranked list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionPriority {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl std::fmt::Display for ActionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionPriority::Critical => write!(f, "CRITICAL"),
            ActionPriority::High => write!(f, "HIGH"),
            ActionPriority::Medium => write!(f, "MEDIUM"),
            ActionPriority::Low => write!(f, "LOW"),
        }
    }
}

/// A ranked remediation action with its business case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub priority: ActionPriority,
    pub description: String,
    /// Upfront cost in currency units. Zero for configuration-only fixes.
    pub estimated_cost: f64,
    /// Days for avoided cost to repay the upfront cost; 0 when cost is 0.
    pub payback_days: f64,
    /// How likely this action eliminates the waste (0-1).
    pub confidence: f64,
}

/// Signal strength bucket for explainability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

/// Temporal pattern of the flagged waste.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimePattern {
    NightHours,
    AfterOccupancy,
    WorkingHours,
    Unclassified,
}

/// Why the diagnosis was made — rendered directly to facility managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Power drawn while nobody is there — the key waste signal.
    pub occupancy_mismatch: bool,
    pub time_pattern: TimePattern,
    pub signal_strength: SignalStrength,
    /// One sentence per contributing rule that actually fired, in
    /// evaluation order.
    pub reasoning: Vec<String>,
}

/// The complete waste diagnosis for one device evaluation.
///
/// Immutable once assembled; identified by `(device_id, detected_at)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteInsight {
    pub category: WasteCategory,
    pub severity: Severity,
    pub power_disparity_w: f64,
    pub estimated_waste_power_w: f64,
    pub duration_hours: f64,
    pub total_wasted_kwh: f64,
    pub cost: CostImpact,
    /// Tariff used for the cost figures (currency per kWh).
    pub cost_per_kwh: f64,
    pub explanation: Explanation,
    pub actions: Vec<RecommendedAction>,
    /// Blended diagnosis confidence (0-1).
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}

impl WasteInsight {
    /// Render a plain-text summary for terminals and notification bodies.
    pub fn render_text(&self, device: &str, location: &str) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} [{}] confidence {:.0}%",
            self.category, self.severity, self.confidence * 100.0
        ));
        lines.push(format!("  device: {device}  location: {location}"));
        lines.push(format!(
            "  disparity {:.0}W, wasted {:.0}W over {:.1}h ({:.2} kWh)",
            self.power_disparity_w,
            self.estimated_waste_power_w,
            self.duration_hours,
            self.total_wasted_kwh
        ));
        lines.push(format!(
            "  cost: {:.2}/day  {:.2}/month  {:.0}/year",
            self.cost.daily, self.cost.monthly, self.cost.annual
        ));
        for step in &self.explanation.reasoning {
            lines.push(format!("  - {step}"));
        }
        for (i, action) in self.actions.iter().enumerate() {
            lines.push(format!(
                "  {}. [{}] {} (cost {:.0}, payback {:.0}d)",
                i + 1,
                action.priority,
                action.description,
                action.estimated_cost,
                action.payback_days
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_cost_impact_exact_multiples() {
        let cost = CostImpact::from_daily(537.6);
        assert!((cost.monthly - 537.6 * 30.0).abs() < f64::EPSILON);
        assert!((cost.annual - 537.6 * 365.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_action_priority_sort_order() {
        let mut priorities = vec![
            ActionPriority::Low,
            ActionPriority::Critical,
            ActionPriority::Medium,
            ActionPriority::High,
        ];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![
                ActionPriority::Critical,
                ActionPriority::High,
                ActionPriority::Medium,
                ActionPriority::Low,
            ]
        );
    }
}
