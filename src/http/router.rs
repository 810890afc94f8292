//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Series listings
        .route("/laeq", get(handlers::list_laeq))
        .route("/laeq-data", get(handlers::list_laeq_data))
        .route("/laeq-metrics", get(handlers::list_metrics))
        .route("/laeq-lmin-lmax", get(handlers::list_extremes))
        .route("/mqtt-status", get(handlers::list_mqtt_status))
        // Dashboard
        .route("/dashboard-summary", get(handlers::dashboard_summary))
        // Report export: view mode and file download
        .route("/export", get(handlers::view_export))
        .route("/export/export", get(handlers::download_export))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
