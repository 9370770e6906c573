// crates/server/src/lib.rs
//! sharp-web server library.
//!
//! Axum HTTP front-end for the SHARP splat generator: image uploads, batch
//! progress, model listing, and static serving of generated outputs.

pub mod cli;
pub mod error;
pub mod progress;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::*;
pub use routes::api_routes;
pub use state::AppState;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Mount point of the output directory.
pub const FILES_MOUNT: &str = sharp_web_core::preview::FILES_MOUNT;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes under `/api`
/// - `/files` serving the output directory (models and batch archives)
/// - `/assets` serving the viewer
/// - the front-end bundle as fallback, when `static_dir` is set
/// - upload size limit, CORS, request tracing
pub fn create_app(
    state: Arc<AppState>,
    static_dir: Option<PathBuf>,
    max_upload_bytes: usize,
) -> Router {
    let files = ServeDir::new(state.output_root());
    let assets = ServeDir::new(&state.assets_dir);

    let mut app = Router::new()
        .merge(api_routes(state))
        .nest_service(FILES_MOUNT, files)
        .nest_service("/assets", assets);

    if let Some(dir) = static_dir {
        tracing::info!(dir = %dir.display(), "Serving front-end");
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
