//! Classifier thresholds and the quality metrics that drive their adaptation.

use serde::{Deserialize, Serialize};

use super::insight::WasteCategory;

/// Default classifier thresholds.
///
/// Commissioning values; the adaptive store drifts the live snapshot away
/// from them within bounded limits.
pub mod waste_thresholds {
    /// Phantom-load trigger: disparity above this while unoccupied (W).
    pub const PHANTOM_LOAD_W: f64 = 500.0;
    /// Post-occupancy trigger: disparity above this after hours (W).
    pub const POST_OCCUPANCY_W: f64 = 200.0;
    /// Inefficient-usage band lower bound, inclusive (W).
    pub const INEFFICIENT_W_LOWER: f64 = 200.0;
    /// Inefficient-usage band upper bound, exclusive (W).
    pub const INEFFICIENT_W_UPPER: f64 = 500.0;

    /// Minimum sustained hours before phantom load is flagged.
    pub const MIN_DURATION_PHANTOM_HOURS: f64 = 6.0;
    /// Minimum sustained hours before post-occupancy waste is flagged (inclusive).
    pub const MIN_DURATION_POST_OCCUPANCY_HOURS: f64 = 2.0;
    /// Inefficient usage has no duration gate.
    pub const MIN_DURATION_INEFFICIENT_HOURS: f64 = 0.0;

    /// Phantom severity escalates to Critical at this many sustained hours.
    pub const PHANTOM_CRITICAL_DURATION_HOURS: f64 = 24.0;
    /// Post-occupancy severity escalates to High above this daily cost.
    pub const POST_OCCUPANCY_DAILY_COST_HIGH: f64 = 500.0;

    /// Relative step applied per false-positive / false-negative feedback.
    pub const ADAPTATION_STEP: f64 = 0.05;
    /// Cumulative drift bound as a factor of the default (0.5x - 1.5x).
    pub const MAX_DRIFT_FACTOR: f64 = 0.5;
}

/// Running alert-quality counters and derived rates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    /// TP / (TP + FP); 0 until any positive is rated.
    pub precision: f64,
    /// TP / (TP + FN); 0 until any actual is rated.
    pub recall: f64,
    pub f1: f64,
}

impl QualityMetrics {
    /// Recompute precision/recall/f1 from the raw counters.
    pub fn recompute(&mut self) {
        let rated_positives = self.true_positives + self.false_positives;
        self.precision = if rated_positives > 0 {
            self.true_positives as f64 / rated_positives as f64
        } else {
            0.0
        };
        let actual_positives = self.true_positives + self.false_negatives;
        self.recall = if actual_positives > 0 {
            self.true_positives as f64 / actual_positives as f64
        } else {
            0.0
        };
        self.f1 = if self.precision + self.recall > 0.0 {
            2.0 * self.precision * self.recall / (self.precision + self.recall)
        } else {
            0.0
        };
    }
}

/// Immutable classifier threshold snapshot.
///
/// Every classification reads exactly one snapshot for its whole decision;
/// the adaptive store publishes new snapshots via atomic swap, never
/// field-by-field mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub phantom_load_w_threshold: f64,
    pub post_occupancy_w_threshold: f64,
    pub inefficient_w_lower: f64,
    pub inefficient_w_upper: f64,
    pub min_duration_phantom_hours: f64,
    pub min_duration_post_occupancy_hours: f64,
    pub min_duration_inefficient_hours: f64,
    pub metrics: QualityMetrics,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            phantom_load_w_threshold: waste_thresholds::PHANTOM_LOAD_W,
            post_occupancy_w_threshold: waste_thresholds::POST_OCCUPANCY_W,
            inefficient_w_lower: waste_thresholds::INEFFICIENT_W_LOWER,
            inefficient_w_upper: waste_thresholds::INEFFICIENT_W_UPPER,
            min_duration_phantom_hours: waste_thresholds::MIN_DURATION_PHANTOM_HOURS,
            min_duration_post_occupancy_hours: waste_thresholds::MIN_DURATION_POST_OCCUPANCY_HOURS,
            min_duration_inefficient_hours: waste_thresholds::MIN_DURATION_INEFFICIENT_HOURS,
            metrics: QualityMetrics::default(),
        }
    }
}

impl ThresholdConfig {
    /// Minimum sustained duration before a category is flagged.
    pub fn min_duration_hours(&self, category: WasteCategory) -> f64 {
        match category {
            WasteCategory::PhantomLoad => self.min_duration_phantom_hours,
            WasteCategory::PostOccupancy => self.min_duration_post_occupancy_hours,
            WasteCategory::InefficientUsage => self.min_duration_inefficient_hours,
            WasteCategory::Normal => 0.0,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recompute() {
        let mut m = QualityMetrics {
            true_positives: 8,
            false_positives: 2,
            false_negatives: 2,
            ..Default::default()
        };
        m.recompute();
        assert!((m.precision - 0.8).abs() < 1e-9);
        assert!((m.recall - 0.8).abs() < 1e-9);
        assert!((m.f1 - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_zero_safe() {
        let mut m = QualityMetrics::default();
        m.recompute();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_min_duration_by_category() {
        let cfg = ThresholdConfig::default();
        assert_eq!(cfg.min_duration_hours(WasteCategory::PhantomLoad), 6.0);
        assert_eq!(cfg.min_duration_hours(WasteCategory::PostOccupancy), 2.0);
        assert_eq!(cfg.min_duration_hours(WasteCategory::Normal), 0.0);
    }
}
