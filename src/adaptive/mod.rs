//! Adaptive threshold store — operator feedback into bounded threshold drift.
//!
//! The learning loop is a small pure reducer
//! `(ThresholdConfig, FeedbackRecord) -> ThresholdConfig`; the store is just
//! "current accepted output of the reducer", published as an immutable
//! snapshot behind an [`arc_swap::ArcSwap`]. Readers (every classifier call)
//! load one snapshot atomically; the single writer path serializes reducer
//! applications behind a mutex so updates are never interleaved.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::types::thresholds::waste_thresholds;
use crate::types::{FeedbackLabel, FeedbackRecord, QualityMetrics, ThresholdConfig, WasteCategory};

/// Pure reducer: fold one feedback record into a threshold snapshot.
///
/// A false positive on a category raises its trigger threshold by the
/// adaptation step (less sensitive); a false negative lowers it
/// symmetrically; a true positive only updates the quality counters. Every
/// threshold is clamped to the drift bounds around its commissioning
/// default, so repeated feedback can never run away.
pub fn apply_feedback(config: &ThresholdConfig, record: &FeedbackRecord) -> ThresholdConfig {
    let mut next = config.clone();

    match record.label {
        FeedbackLabel::TruePositive => next.metrics.true_positives += 1,
        FeedbackLabel::FalsePositive => {
            next.metrics.false_positives += 1;
            adjust_threshold(&mut next, record.category, 1.0 + waste_thresholds::ADAPTATION_STEP);
        }
        FeedbackLabel::FalseNegative => {
            next.metrics.false_negatives += 1;
            adjust_threshold(&mut next, record.category, 1.0 - waste_thresholds::ADAPTATION_STEP);
        }
    }

    next.metrics.recompute();
    next
}

/// Multiply a category's trigger threshold, clamped to the drift bounds.
fn adjust_threshold(config: &mut ThresholdConfig, category: WasteCategory, factor: f64) {
    let bounds = |default: f64| {
        (
            default * (1.0 - waste_thresholds::MAX_DRIFT_FACTOR),
            default * (1.0 + waste_thresholds::MAX_DRIFT_FACTOR),
        )
    };

    match category {
        WasteCategory::PhantomLoad => {
            let (lo, hi) = bounds(waste_thresholds::PHANTOM_LOAD_W);
            config.phantom_load_w_threshold =
                (config.phantom_load_w_threshold * factor).clamp(lo, hi);
        }
        WasteCategory::PostOccupancy => {
            let (lo, hi) = bounds(waste_thresholds::POST_OCCUPANCY_W);
            config.post_occupancy_w_threshold =
                (config.post_occupancy_w_threshold * factor).clamp(lo, hi);
        }
        WasteCategory::InefficientUsage => {
            let (lo, hi) = bounds(waste_thresholds::INEFFICIENT_W_LOWER);
            config.inefficient_w_lower = (config.inefficient_w_lower * factor).clamp(lo, hi);
        }
        // "Normal" was never triggered by a threshold; counters only.
        WasteCategory::Normal => {}
    }
}

/// Process-wide adaptive threshold state.
pub struct ThresholdStore {
    current: ArcSwap<ThresholdConfig>,
    /// Serializes reducer applications. Readers never take this.
    writer: Mutex<()>,
}

impl ThresholdStore {
    pub fn new(initial: ThresholdConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            writer: Mutex::new(()),
        }
    }

    /// Atomic snapshot for one classification. The snapshot never changes
    /// underneath the caller.
    pub fn snapshot(&self) -> Arc<ThresholdConfig> {
        self.current.load_full()
    }

    /// Current quality metrics.
    pub fn metrics(&self) -> QualityMetrics {
        self.current.load().metrics
    }

    /// Fold a feedback record into the live snapshot and publish the result.
    ///
    /// Returns the newly published snapshot.
    pub fn ingest(&self, record: &FeedbackRecord) -> Arc<ThresholdConfig> {
        let _guard = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let next = Arc::new(apply_feedback(&self.current.load(), record));
        self.current.store(Arc::clone(&next));
        info!(
            label = ?record.label,
            category = %record.category,
            precision = next.metrics.precision,
            recall = next.metrics.recall,
            f1 = next.metrics.f1,
            "ingested feedback"
        );
        next
    }
}

impl Default for ThresholdStore {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
