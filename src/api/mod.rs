//! REST API module using Axum
//!
//! HTTP surface for the waste-intelligence core: evaluation, alert
//! lifecycle, building reports, feedback, and metadata, all under
//! `/api/v1/*` with a uniform JSON envelope.

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ServiceState;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete application router.
pub fn create_app(state: ServiceState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
