//! Building-level report snapshot types.
//!
//! A `BuildingReport` is a read-only projection over the current alert and
//! recommendation stores — regenerated on demand, never a source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::alert::Alert;

/// Alert counts by severity plus the total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub open_alerts: usize,
    /// Severity display name → count.
    pub by_severity: HashMap<String, usize>,
}

/// Aggregate cost figures across all included alerts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportCost {
    pub daily: f64,
    pub monthly: f64,
    pub annual: f64,
    /// Annual cost of alerts whose recommendations are not yet completed —
    /// what fixing the remaining leaks would save.
    pub potential_savings_annual: f64,
}

/// Recommendation pipeline status for the report footer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub total: usize,
    pub approved: usize,
    /// Mean payback in 30-day months across proposed + approved
    /// recommendations; 0 when there are none.
    pub avg_payback_months: f64,
}

/// Comprehensive snapshot for one building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingReport {
    pub building_id: String,
    pub report_date: DateTime<Utc>,
    pub summary: AlertSummary,
    pub cost: ReportCost,
    /// Largest leaks first (annual cost descending, ties by severity then
    /// recency), at most the configured top-N.
    pub top_leaks: Vec<Alert>,
    /// Waste category → annual cost.
    pub by_category: HashMap<String, f64>,
    /// Floor → annual cost ("unknown" when the alert has no floor).
    pub by_floor: HashMap<String, f64>,
    /// Device category → annual cost.
    pub by_type: HashMap<String, f64>,
    pub recommendations: RecommendationSummary,
}
