//! External disparity-model boundary.
//!
//! The regression model that turns device/time features into a disparity
//! prediction lives outside this service. The core consumes it as an opaque
//! async function behind [`DisparityModel`]; an unreachable upstream
//! surfaces as `UpstreamUnavailable` rather than classifying on partial
//! data.

use async_trait::async_trait;

use crate::error::AnalysisError;

/// Features handed to the upstream model for one device evaluation.
#[derive(Debug, Clone)]
pub struct DeviceFeatures {
    pub device_id: String,
    pub device_category: String,
    pub hour: u8,
    pub day_of_week: u8,
    pub is_weekend: bool,
    pub month: u8,
    /// Rated maximum draw of the device (W).
    pub power_max: f64,
    pub baseline_power_w: Option<f64>,
    pub actual_power_w: Option<f64>,
}

/// Raw model output before normalization.
#[derive(Debug, Clone, Copy)]
pub struct DisparityPrediction {
    pub value: f64,
    pub confidence: f64,
}

/// Opaque upstream predictor: `predict(features) -> (value, confidence)`.
#[async_trait]
pub trait DisparityModel: Send + Sync {
    async fn predict(&self, features: &DeviceFeatures)
        -> Result<DisparityPrediction, AnalysisError>;
}

/// Baseline-residual fallback used when no trained regressor is deployed.
///
/// The service runs with or without the trained model: when both metered
/// actual and baseline are present, the residual is the disparity with high
/// confidence; anything less is an upstream gap, not a guess.
pub struct ResidualModel;

#[async_trait]
impl DisparityModel for ResidualModel {
    async fn predict(
        &self,
        features: &DeviceFeatures,
    ) -> Result<DisparityPrediction, AnalysisError> {
        match (features.actual_power_w, features.baseline_power_w) {
            (Some(actual), Some(baseline)) => Ok(DisparityPrediction {
                value: actual - baseline,
                confidence: 0.9,
            }),
            _ => Err(AnalysisError::UpstreamUnavailable(format!(
                "no disparity model deployed and device {} has no metered baseline/actual pair",
                features.device_id
            ))),
        }
    }
}

/// Fixed-output model for tests and demos.
pub struct StaticModel {
    pub value: f64,
    pub confidence: f64,
}

#[async_trait]
impl DisparityModel for StaticModel {
    async fn predict(
        &self,
        _features: &DeviceFeatures,
    ) -> Result<DisparityPrediction, AnalysisError> {
        Ok(DisparityPrediction {
            value: self.value,
            confidence: self.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(actual: Option<f64>, baseline: Option<f64>) -> DeviceFeatures {
        DeviceFeatures {
            device_id: "SERVER_1".to_string(),
            device_category: "server".to_string(),
            hour: 2,
            day_of_week: 3,
            is_weekend: false,
            month: 2,
            power_max: 3500.0,
            baseline_power_w: baseline,
            actual_power_w: actual,
        }
    }

    #[tokio::test]
    async fn test_residual_model_uses_metered_pair() {
        let p = ResidualModel
            .predict(&features(Some(3300.0), Some(500.0)))
            .await
            .unwrap();
        assert!((p.value - 2800.0).abs() < 1e-9);
        assert!(p.confidence > 0.8);
    }

    #[tokio::test]
    async fn test_residual_model_requires_both_sides() {
        let err = ResidualModel
            .predict(&features(None, Some(500.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UpstreamUnavailable(_)));
    }
}
