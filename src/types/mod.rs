//! Shared data structures for the energy-waste reasoning pipeline
//!
//! This module defines the core types, in pipeline order:
//! - `DisparitySignal`, `OccupancyContext` (normalized inputs)
//! - `WasteCategory`, `Severity`, `CostImpact`, `WasteInsight` (diagnosis)
//! - `Alert`, `Recommendation`, `FeedbackRecord` (lifecycle entities)
//! - `BuildingReport` (aggregation snapshot)
//! - `ThresholdConfig` (adaptive classifier configuration)

mod signal;
mod insight;
mod alert;
mod report;
pub mod thresholds;

pub use signal::*;
pub use insight::*;
pub use alert::*;
pub use report::*;
pub use thresholds::*;
