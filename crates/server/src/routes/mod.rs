//! API route handlers for the sharp-web server.

pub mod generate;
pub mod health;
pub mod models;
pub mod progress;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET  /api/health - Health check
/// - POST /api/generate - Upload images (multipart) and run a batch
/// - POST /api/generate/paths - Run a batch over local image paths
/// - GET  /api/models - List every model in the output directory
/// - GET  /api/preview?path=... - Viewer and download reference for a model
/// - GET  /api/progress - Current batch progress
/// - GET  /api/progress/stream - SSE stream of batch progress
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", generate::router())
        .nest("/api", models::router())
        .nest("/api", progress::router())
        .with_state(state)
}
