//! Alert, recommendation, and feedback entities.
//!
//! Alerts are the mutable, deduplicated wrapper around recurring insights for
//! one device; recommendations are the persisted, status-tracked form of a
//! recommended action; feedback records are the append-only operator
//! assessments consumed by threshold adaptation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::insight::{ActionPriority, CostImpact, Severity, WasteCategory};

/// Physical placement of a device within a building.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Location {
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
}

/// Alert lifecycle state.
///
/// Transitions only move forward (Open → Acknowledged → Approved → Resolved),
/// except that a Resolved alert reopens when the same device re-triggers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Approved,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Open => write!(f, "open"),
            AlertStatus::Acknowledged => write!(f, "acknowledged"),
            AlertStatus::Approved => write!(f, "approved"),
            AlertStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Deduplicated alert for one device/location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub device_id: String,
    /// Device category (e.g. "hvac", "server", "lighting") for breakdowns.
    pub device_category: String,
    pub location: Location,
    pub category: WasteCategory,
    pub severity: Severity,
    pub cost: CostImpact,
    pub status: AlertStatus,
    /// Draw while unoccupied was the triggering evidence.
    pub occupancy_mismatch: bool,
    /// Reasoning sentences from the most recent triggering insight.
    pub evidence: Vec<String>,
    /// Number of qualifying insights folded into this alert.
    pub detection_count: u32,
    pub first_detected: DateTime<Utc>,
    pub last_detected: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Ids of recommendations generated for this alert.
    #[serde(default)]
    pub recommendation_ids: Vec<String>,
}

/// Recommendation workflow state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Proposed,
    Approved,
    InProgress,
    Completed,
    Rejected,
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationStatus::Proposed => write!(f, "proposed"),
            RecommendationStatus::Approved => write!(f, "approved"),
            RecommendationStatus::InProgress => write!(f, "in_progress"),
            RecommendationStatus::Completed => write!(f, "completed"),
            RecommendationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Persisted remediation action, owned by the alert it was generated for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation_id: String,
    pub alert_id: String,
    pub priority: ActionPriority,
    pub description: String,
    pub estimated_cost: f64,
    pub payback_days: f64,
    pub confidence: f64,
    pub status: RecommendationStatus,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    /// Payback expressed in months (30-day months, consistent with the
    /// monthly cost figure being daily x 30).
    pub fn payback_months(&self) -> f64 {
        self.payback_days / 30.0
    }
}

/// Operator assessment of an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLabel {
    /// Confirmed waste — the alert was right.
    TruePositive,
    /// No waste here — the alert was noise.
    FalsePositive,
    /// Waste the operator found that the system missed.
    FalseNegative,
}

/// Append-only feedback record consumed by the adaptive threshold store.
///
/// Category is denormalized from the alert at submission time so adaptation
/// never needs a live alert lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub device_id: String,
    #[serde(default)]
    pub alert_id: Option<String>,
    pub label: FeedbackLabel,
    pub category: WasteCategory,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}
