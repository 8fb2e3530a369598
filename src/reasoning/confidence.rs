//! Confidence scorer — one blended figure for the whole diagnosis.

use crate::types::Severity;

/// Weight on the model's own prediction confidence.
const SIGNAL_WEIGHT: f64 = 0.6;
/// Weight on the (possibly capped) occupancy confidence.
const OCCUPANCY_WEIGHT: f64 = 0.3;
/// Weight on the severity conviction bonus.
const SEVERITY_WEIGHT: f64 = 0.1;

/// Blend signal confidence, effective occupancy confidence, and severity
/// into one diagnosis confidence, clamped to [0,1].
///
/// The occupancy value must already be the effective one from the context
/// builder (capped at 0.5 for unknown status).
pub fn score(signal_confidence: f64, occupancy_confidence: f64, severity: Severity) -> f64 {
    let raw = SIGNAL_WEIGHT * signal_confidence
        + OCCUPANCY_WEIGHT * occupancy_confidence
        + SEVERITY_WEIGHT * severity.confidence_bonus();
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_blend() {
        // 0.6*0.95 + 0.3*0.98 + 0.1*1.0 = 0.964
        let c = score(0.95, 0.98, Severity::Critical);
        assert!((c - 0.964).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_occupancy_scores_lower() {
        let occupied = score(0.92, 0.95, Severity::Low);
        let unknown = score(0.92, 0.5, Severity::Low);
        assert!(unknown < occupied);
    }

    #[test]
    fn test_bounds() {
        assert!(score(0.0, 0.0, Severity::Low) >= 0.0);
        assert!(score(1.0, 1.0, Severity::Critical) <= 1.0);
    }
}
