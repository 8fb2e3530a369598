//! Enerlens: Building Energy Waste Operational Intelligence
//!
//! Converts power-disparity signals from an external regression model into
//! classified, costed, explainable waste diagnoses, and rolls them up into
//! building-level alerts and reports that learn from operator feedback.
//!
//! ## Architecture
//!
//! - **Reasoning pipeline**: signal + occupancy context → category, severity,
//!   cost, recommendations, confidence — pure per evaluation
//! - **Alert lifecycle**: deduplicated per-device alerts with a forward-only
//!   state machine (Open → Acknowledged → Approved → Resolved)
//! - **Aggregation**: read-side building reports over the alert store
//! - **Adaptation**: operator feedback nudges classifier thresholds within
//!   bounded drift, tracked by precision/recall/F1

pub mod config;
pub mod error;
pub mod types;
pub mod model;
pub mod reasoning;
pub mod adaptive;
pub mod alerts;
pub mod report;
pub mod storage;
pub mod api;

// Re-export building configuration
pub use config::BuildingConfig;

// Re-export commonly used types
pub use types::{
    Alert, AlertStatus, BuildingReport, CostImpact, DisparitySignal, FeedbackLabel,
    FeedbackRecord, OccupancyContext, OccupancyStatus, Recommendation, RecommendationStatus,
    Severity, ThresholdConfig, WasteCategory, WasteInsight,
};

// Re-export the pipeline and stores
pub use adaptive::ThresholdStore;
pub use alerts::AlertManager;
pub use error::AnalysisError;
pub use model::{DisparityModel, ResidualModel};
pub use reasoning::{EvaluationInput, WasteAnalyzer};
