// crates/server/src/routes/models.rs
//! Produced-model listing and selection preview.
//!
//! - GET /models — every model file under the output root
//! - GET /preview?path=... — viewer/download references for one model

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sharp_web_core::discovery::list_models;
use sharp_web_core::preview::file_url;
use sharp_web_core::{render_preview, Preview};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One entry of the model selector.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct ModelChoice {
    /// File name shown to the user.
    pub label: String,
    pub path: PathBuf,
    pub download_url: String,
}

impl ModelChoice {
    /// `None` if `path` is not beneath `output_root`.
    pub fn new(output_root: &Path, path: &Path) -> Option<Self> {
        let download_url = match file_url(output_root, path) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping model outside output root");
                return None;
            }
        };
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Some(Self {
            label,
            path: path.to_path_buf(),
            download_url,
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PreviewQuery {
    pub path: Option<PathBuf>,
}

/// GET /api/models — List every model currently in the output root.
async fn get_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ModelChoice>>> {
    let root = state.output_root().to_path_buf();
    let extension = state.orchestrator.config().model_extension.clone();

    let choices = tokio::task::spawn_blocking(move || {
        list_models(&root, &extension)
            .iter()
            .filter_map(|path| ModelChoice::new(&root, path))
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))?;

    Ok(Json(choices))
}

/// GET /api/preview — Render the viewer for a selected model.
///
/// Missing or empty `path` renders the placeholder. Never touches disk.
async fn get_preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Json<Preview>> {
    let preview = render_preview(state.output_root(), query.path.as_deref())?;
    Ok(Json(preview))
}

/// Build the models router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/models", get(get_models))
        .route("/preview", get(get_preview))
}
