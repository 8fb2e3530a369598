//! Signal normalizer — raw model output into a `DisparitySignal`.

use crate::error::AnalysisError;
use crate::types::DisparitySignal;

/// Normalize raw model output plus known power figures into a signal.
///
/// `magnitude_w` is the predicted deviation floored at zero; `variance_pct`
/// is only derived when both baseline and actual are supplied and the
/// baseline is positive. No side effects.
pub fn normalize(
    value: f64,
    confidence: f64,
    baseline_w: Option<f64>,
    actual_w: Option<f64>,
) -> Result<DisparitySignal, AnalysisError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(AnalysisError::InvalidSignal(format!(
            "confidence must be in [0,1], got {confidence}"
        )));
    }
    if !value.is_finite() {
        return Err(AnalysisError::InvalidSignal(format!(
            "disparity value must be finite, got {value}"
        )));
    }

    let baseline = baseline_w.unwrap_or(0.0);
    if baseline < 0.0 {
        return Err(AnalysisError::InvalidSignal(format!(
            "baseline power must be non-negative, got {baseline}"
        )));
    }
    if let Some(actual) = actual_w {
        if actual < 0.0 {
            return Err(AnalysisError::InvalidSignal(format!(
                "actual power must be non-negative, got {actual}"
            )));
        }
    }

    let variance_pct = match actual_w {
        Some(actual) if baseline > 0.0 => Some((actual - baseline) / baseline * 100.0),
        _ => None,
    };

    Ok(DisparitySignal {
        magnitude_w: value.max(0.0),
        confidence,
        baseline_w: baseline,
        actual_w,
        variance_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_floored_at_zero() {
        let signal = normalize(-120.0, 0.9, None, None).unwrap();
        assert_eq!(signal.magnitude_w, 0.0);
    }

    #[test]
    fn test_variance_requires_both_sides() {
        let signal = normalize(400.0, 0.9, Some(300.0), Some(700.0)).unwrap();
        let variance = signal.variance_pct.unwrap();
        assert!((variance - 133.333).abs() < 0.001);

        assert!(normalize(400.0, 0.9, Some(300.0), None)
            .unwrap()
            .variance_pct
            .is_none());
        assert!(normalize(400.0, 0.9, None, Some(700.0))
            .unwrap()
            .variance_pct
            .is_none());
    }

    #[test]
    fn test_zero_baseline_yields_no_variance() {
        let signal = normalize(2800.0, 0.95, Some(0.0), Some(2800.0)).unwrap();
        assert!(signal.variance_pct.is_none());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        assert!(normalize(100.0, 1.2, None, None).is_err());
        assert!(normalize(100.0, -0.1, None, None).is_err());
        assert!(normalize(100.0, f64::NAN, None, None).is_err());
    }

    #[test]
    fn test_negative_power_rejected() {
        assert!(normalize(100.0, 0.9, Some(-5.0), None).is_err());
        assert!(normalize(100.0, 0.9, Some(500.0), Some(-1.0)).is_err());
    }
}
