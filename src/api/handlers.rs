//! API handlers — consistent envelope, typed requests and responses.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or
//! [`ApiErrorResponse`]. Enumerated query/body fields arrive as strings and
//! are parsed explicitly so a bad value produces a structured validation
//! error instead of a bare deserializer rejection.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::alerts::{AlertFilter, AlertManager};
use crate::error::AnalysisError;
use crate::model::{DeviceFeatures, DisparityModel};
use crate::reasoning::{context, signal, ContextFields, EvaluationInput, WasteAnalyzer};
use crate::types::{
    Alert, AlertStatus, FeedbackLabel, FeedbackRecord, Location, OccupancyStatus, QualityMetrics,
    Recommendation, Season, Severity, ThresholdConfig, WasteCategory, WasteInsight,
};

// ============================================================================
// Shared state
// ============================================================================

/// Everything the handlers need; cheap to clone per request.
#[derive(Clone)]
pub struct ServiceState {
    pub analyzer: WasteAnalyzer,
    pub alerts: Arc<AlertManager>,
    pub model: Arc<dyn DisparityModel>,
}

// ============================================================================
// Request / response types
// ============================================================================

/// One-device evaluation request.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub device_id: String,
    /// Appliance category, e.g. "hvac", "server", "lighting".
    pub category: String,
    #[serde(default)]
    pub location: Option<Location>,
    pub hour: i64,
    pub day_of_week: i64,
    pub is_weekend: bool,
    pub month: i64,
    #[serde(default)]
    pub season: Option<Season>,
    /// Rated maximum draw of the device (W).
    pub power_max: f64,
    #[serde(default)]
    pub baseline_power_w: Option<f64>,
    #[serde(default)]
    pub actual_power_w: Option<f64>,
    #[serde(default)]
    pub occupancy_status: Option<String>,
    #[serde(default)]
    pub occupancy_confidence: Option<f64>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub cost_per_kwh: Option<f64>,
}

/// Diagnosis for one device, with request echo and any lifecycle effect.
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub device_id: String,
    pub location: Location,
    pub insight: WasteInsight,
    /// Alert created or updated by this evaluation, if the insight qualified.
    pub alert_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchEvaluateResponse {
    pub count: usize,
    pub insights: Vec<EvaluateResponse>,
    /// Sums over non-Normal insights only.
    pub total_daily_loss: f64,
    pub total_monthly_loss: f64,
    pub total_annual_loss: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_severity: Option<String>,
    #[serde(default)]
    pub min_annual_cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub acknowledged_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub device_id: String,
    #[serde(default)]
    pub alert_id: Option<String>,
    /// "true_positive" | "false_positive" | "false_negative"
    pub label: String,
    /// Required when no alert_id is given.
    #[serde(default)]
    pub category: Option<String>,
    pub submitted_by: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub metrics: QualityMetrics,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub categories: Vec<String>,
    pub severities: Vec<String>,
    pub occupancy_statuses: Vec<String>,
    pub cost_per_kwh: f64,
    pub currency: String,
}

// ============================================================================
// Enum parsing (explicit, for structured validation errors)
// ============================================================================

fn parse_occupancy_status(value: &str) -> Result<OccupancyStatus, AnalysisError> {
    match value {
        "occupied" => Ok(OccupancyStatus::Occupied),
        "unoccupied" => Ok(OccupancyStatus::Unoccupied),
        "unknown" => Ok(OccupancyStatus::Unknown),
        other => Err(AnalysisError::Validation(format!(
            "occupancy_status must be occupied|unoccupied|unknown, got {other:?}"
        ))),
    }
}

fn parse_category(value: &str) -> Result<WasteCategory, AnalysisError> {
    match value {
        "phantom_load" => Ok(WasteCategory::PhantomLoad),
        "post_occupancy" => Ok(WasteCategory::PostOccupancy),
        "inefficient_usage" => Ok(WasteCategory::InefficientUsage),
        "normal" => Ok(WasteCategory::Normal),
        other => Err(AnalysisError::Validation(format!(
            "unknown waste category {other:?}"
        ))),
    }
}

fn parse_severity(value: &str) -> Result<Severity, AnalysisError> {
    match value {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => Err(AnalysisError::Validation(format!(
            "severity must be low|medium|high|critical, got {other:?}"
        ))),
    }
}

fn parse_alert_status(value: &str) -> Result<AlertStatus, AnalysisError> {
    match value {
        "open" => Ok(AlertStatus::Open),
        "acknowledged" => Ok(AlertStatus::Acknowledged),
        "approved" => Ok(AlertStatus::Approved),
        "resolved" => Ok(AlertStatus::Resolved),
        other => Err(AnalysisError::Validation(format!(
            "status must be open|acknowledged|approved|resolved, got {other:?}"
        ))),
    }
}

fn parse_label(value: &str) -> Result<FeedbackLabel, AnalysisError> {
    match value {
        "true_positive" => Ok(FeedbackLabel::TruePositive),
        "false_positive" => Ok(FeedbackLabel::FalsePositive),
        "false_negative" => Ok(FeedbackLabel::FalseNegative),
        other => Err(AnalysisError::Validation(format!(
            "label must be true_positive|false_positive|false_negative, got {other:?}"
        ))),
    }
}

// ============================================================================
// Evaluation core (shared by single and batch)
// ============================================================================

async fn evaluate_one(
    state: &ServiceState,
    request: EvaluateRequest,
) -> Result<EvaluateResponse, AnalysisError> {
    if request.power_max <= 0.0 {
        return Err(AnalysisError::Validation(format!(
            "power_max must be positive, got {}",
            request.power_max
        )));
    }
    if let Some(duration) = request.duration_hours {
        if duration < 0.0 || !duration.is_finite() {
            return Err(AnalysisError::Validation(format!(
                "duration_hours must be a non-negative number, got {duration}"
            )));
        }
    }
    let occupancy_status = request
        .occupancy_status
        .as_deref()
        .map(parse_occupancy_status)
        .transpose()?;

    let default_confidence = if crate::config::is_initialized() {
        crate::config::get().classifier.default_occupancy_confidence
    } else {
        0.8
    };
    let context = context::build(
        &ContextFields {
            hour: request.hour,
            day_of_week: request.day_of_week,
            is_weekend: request.is_weekend,
            month: request.month,
            season: request.season,
            occupancy_status,
            occupancy_confidence: request.occupancy_confidence,
        },
        default_confidence,
    )?;

    let features = DeviceFeatures {
        device_id: request.device_id.clone(),
        device_category: request.category.clone(),
        hour: context.hour,
        day_of_week: context.day_of_week,
        is_weekend: context.is_weekend,
        month: context.month,
        power_max: request.power_max,
        baseline_power_w: request.baseline_power_w,
        actual_power_w: request.actual_power_w,
    };
    let prediction = state.model.predict(&features).await?;

    let signal = signal::normalize(
        prediction.value,
        prediction.confidence,
        request.baseline_power_w,
        request.actual_power_w,
    )?;

    let insight = state.analyzer.analyze(&EvaluationInput {
        signal,
        context,
        device_category: request.category.clone(),
        duration_hours: request.duration_hours.unwrap_or(1.0),
        cost_per_kwh: request.cost_per_kwh,
    });

    let location = request.location.clone().unwrap_or_default();
    let outcome = state.alerts.ingest(
        &request.device_id,
        &request.category,
        location.clone(),
        &insight,
    );

    Ok(EvaluateResponse {
        device_id: request.device_id,
        location,
        alert_id: outcome.alert().map(|a| a.alert_id.clone()),
        insight,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/evaluate — diagnose one device.
pub async fn evaluate(
    State(state): State<ServiceState>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response {
    match evaluate_one(&state, request).await {
        Ok(response) => ApiResponse::ok(response),
        Err(e) => ApiErrorResponse::from_analysis_error(&e),
    }
}

/// POST /api/v1/evaluate/batch — diagnose many devices concurrently.
///
/// Device evaluations fan out in parallel; each device's alert key is
/// independent so completion order doesn't affect correctness. Any invalid
/// item rejects the whole batch before results are reported.
pub async fn evaluate_batch(
    State(state): State<ServiceState>,
    axum::Json(requests): axum::Json<Vec<EvaluateRequest>>,
) -> Response {
    let results = join_all(
        requests
            .into_iter()
            .map(|request| evaluate_one(&state, request)),
    )
    .await;

    let mut insights = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(response) => insights.push(response),
            Err(e) => return ApiErrorResponse::from_analysis_error(&e),
        }
    }

    let (mut daily, mut monthly, mut annual) = (0.0, 0.0, 0.0);
    for item in &insights {
        if item.insight.category.is_waste() {
            daily += item.insight.cost.daily;
            monthly += item.insight.cost.monthly;
            annual += item.insight.cost.annual;
        }
    }

    ApiResponse::ok(BatchEvaluateResponse {
        count: insights.len(),
        insights,
        total_daily_loss: daily,
        total_monthly_loss: monthly,
        total_annual_loss: annual,
    })
}

/// GET /api/v1/report/:building_id — building-level aggregation.
pub async fn building_report(
    State(state): State<ServiceState>,
    Path(building_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let category = match query.category.as_deref().map(parse_category).transpose() {
        Ok(c) => c,
        Err(e) => return ApiErrorResponse::from_analysis_error(&e),
    };

    let alerts = state.alerts.query(&AlertFilter {
        floor: query.floor,
        category,
        ..Default::default()
    });
    let included: std::collections::HashSet<&str> =
        alerts.iter().map(|a| a.alert_id.as_str()).collect();
    let recommendations: Vec<Recommendation> = state
        .alerts
        .recommendations()
        .into_iter()
        .filter(|r| included.contains(r.alert_id.as_str()))
        .collect();

    let top_n = if crate::config::is_initialized() {
        crate::config::get().report.top_leaks
    } else {
        3
    };
    ApiResponse::ok(crate::report::build_report(
        &building_id,
        &alerts,
        &recommendations,
        top_n,
    ))
}

/// GET /api/v1/alerts — filtered alert list.
pub async fn list_alerts(
    State(state): State<ServiceState>,
    Query(query): Query<AlertsQuery>,
) -> Response {
    let filter = || -> Result<AlertFilter, AnalysisError> {
        Ok(AlertFilter {
            status: query.status.as_deref().map(parse_alert_status).transpose()?,
            floor: query.floor.clone(),
            category: query.category.as_deref().map(parse_category).transpose()?,
            min_severity: query
                .min_severity
                .as_deref()
                .map(parse_severity)
                .transpose()?,
            min_annual_cost: query.min_annual_cost,
        })
    };
    match filter() {
        Ok(filter) => ApiResponse::ok(state.alerts.query(&filter)),
        Err(e) => ApiErrorResponse::from_analysis_error(&e),
    }
}

/// GET /api/v1/alerts/:id — one alert with its recommendations.
pub async fn get_alert(State(state): State<ServiceState>, Path(id): Path<String>) -> Response {
    match state.alerts.get(&id) {
        Some(alert) => {
            #[derive(Serialize)]
            struct AlertDetail {
                #[serde(flatten)]
                alert: Alert,
                recommendations: Vec<Recommendation>,
            }
            let recommendations = state.alerts.recommendations_for(&id);
            ApiResponse::ok(AlertDetail {
                alert,
                recommendations,
            })
        }
        None => ApiErrorResponse::not_found(format!("alert {id}")),
    }
}

/// POST /api/v1/alerts/:id/acknowledge — operator takes ownership.
pub async fn acknowledge_alert(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<AcknowledgeRequest>,
) -> Response {
    match state.alerts.acknowledge(&id, &request.acknowledged_by) {
        Ok(alert) => ApiResponse::ok(alert),
        Err(e) => ApiErrorResponse::from_analysis_error(&e),
    }
}

/// POST /api/v1/recommendations/:id/approve — green-light a fix.
pub async fn approve_recommendation(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
    axum::Json(request): axum::Json<ApproveRequest>,
) -> Response {
    match state.alerts.approve_recommendation(&id, &request.approved_by) {
        Ok(rec) => ApiResponse::ok(rec),
        Err(e) => ApiErrorResponse::from_analysis_error(&e),
    }
}

/// POST /api/v1/feedback — operator labels an alert outcome.
pub async fn submit_feedback(
    State(state): State<ServiceState>,
    axum::Json(request): axum::Json<FeedbackRequest>,
) -> Response {
    let label = match parse_label(&request.label) {
        Ok(l) => l,
        Err(e) => return ApiErrorResponse::from_analysis_error(&e),
    };

    // Category comes from the alert when one is referenced, otherwise it
    // must be supplied: adaptation has nothing to adjust without one.
    let category = match (&request.alert_id, &request.category) {
        (Some(alert_id), _) => match state.alerts.get(alert_id) {
            Some(alert) => alert.category,
            None => return ApiErrorResponse::not_found(format!("alert {alert_id}")),
        },
        (None, Some(category)) => match parse_category(category) {
            Ok(c) => c,
            Err(e) => return ApiErrorResponse::from_analysis_error(&e),
        },
        (None, None) => {
            return ApiErrorResponse::bad_request(
                "feedback requires either alert_id or category",
            )
        }
    };

    let record = FeedbackRecord {
        device_id: request.device_id,
        alert_id: request.alert_id,
        label,
        category,
        submitted_by: request.submitted_by,
        submitted_at: Utc::now(),
    };

    if let Err(e) = crate::storage::feedback::persist(&record) {
        warn!(error = %e, "failed to persist feedback record");
    }

    let snapshot = state.analyzer.thresholds().ingest(&record);
    ApiResponse::ok(FeedbackResponse {
        metrics: snapshot.metrics,
        thresholds: (*snapshot).clone(),
    })
}

/// GET /api/v1/feedback/stats — current alert-quality metrics.
pub async fn feedback_stats(State(state): State<ServiceState>) -> Response {
    let snapshot = state.analyzer.thresholds().snapshot();
    ApiResponse::ok(FeedbackResponse {
        metrics: snapshot.metrics,
        thresholds: (*snapshot).clone(),
    })
}

/// GET /api/v1/metadata — enumerations and tariff, purely descriptive.
pub async fn metadata() -> Response {
    let (cost_per_kwh, currency) = if crate::config::is_initialized() {
        let tariff = &crate::config::get().tariff;
        (tariff.cost_per_kwh, tariff.currency.clone())
    } else {
        (8.0, "INR".to_string())
    };
    ApiResponse::ok(MetadataResponse {
        categories: WasteCategory::ALL.iter().map(ToString::to_string).collect(),
        severities: Severity::ALL.iter().map(|s| s.to_string().to_lowercase()).collect(),
        occupancy_statuses: vec![
            OccupancyStatus::Occupied.to_string(),
            OccupancyStatus::Unoccupied.to_string(),
            OccupancyStatus::Unknown.to_string(),
        ],
        cost_per_kwh,
        currency,
    })
}

/// GET /api/v1/system/health — liveness and store counts.
pub async fn system_health(State(state): State<ServiceState>) -> Response {
    ApiResponse::ok(serde_json::json!({
        "status": "healthy",
        "alerts": state.alerts.len(),
        "storage": crate::storage::is_initialized(),
        "metrics": state.analyzer.thresholds().metrics(),
    }))
}
