//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ServiceState};

/// Build the v1 API router.
pub fn api_routes(state: ServiceState) -> Router {
    Router::new()
        // Evaluation
        .route("/evaluate", post(handlers::evaluate))
        .route("/evaluate/batch", post(handlers::evaluate_batch))
        // Reports
        .route("/report/:building_id", get(handlers::building_report))
        // Alerts
        .route("/alerts", get(handlers::list_alerts))
        .route("/alerts/:id", get(handlers::get_alert))
        .route("/alerts/:id/acknowledge", post(handlers::acknowledge_alert))
        // Recommendations
        .route(
            "/recommendations/:id/approve",
            post(handlers::approve_recommendation),
        )
        // Feedback (stats before parameterized paths, none here, kept flat)
        .route("/feedback", post(handlers::submit_feedback))
        .route("/feedback/stats", get(handlers::feedback_stats))
        // Descriptive
        .route("/metadata", get(handlers::metadata))
        .route("/system/health", get(handlers::system_health))
        .with_state(state)
}
