// crates/server/src/routes/generate.rs
//! Batch generation endpoints.
//!
//! - POST /generate — multipart upload, one `images` part per image
//! - POST /generate/paths — JSON list of images already on disk

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sharp_web_core::preview::file_url;
use sharp_web_core::{BatchReport, GenerationOutcome, Preview};

use super::models::ModelChoice;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Result of one batch, shaped for the front-end.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// One status entry per image, in input order.
    pub log: Vec<String>,
    /// `log` joined with newlines, ready for a text box.
    pub log_text: String,
    pub models: Vec<ModelChoice>,
    pub archive_url: Option<String>,
    pub archive_error: Option<String>,
    pub selected: Option<PathBuf>,
    pub preview: Option<Preview>,
    pub outcomes: Vec<GenerationOutcome>,
}

impl GenerateResponse {
    fn from_report(output_root: &Path, report: BatchReport) -> Self {
        let models = report
            .models
            .iter()
            .filter_map(|path| ModelChoice::new(output_root, path))
            .collect();
        let archive_url = report
            .archive
            .as_deref()
            .and_then(|path| file_url(output_root, path).ok());

        Self {
            log_text: report.log_text(),
            log: report.log,
            models,
            archive_url,
            archive_error: report.archive_error,
            selected: report.models.first().cloned(),
            preview: report.selection,
            outcomes: report.outcomes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneratePathsRequest {
    pub paths: Vec<PathBuf>,
}

/// Reduce a client-supplied file name to a single safe path component.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// POST /api/generate — Stage uploads in a scratch directory and run them.
///
/// Each upload gets its own subdirectory so two files with the same name
/// never overwrite each other. The batch task owns the scratch directory
/// and removes it once the last image is done; outputs live in the output
/// root.
async fn generate_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<GenerateResponse>> {
    let staging = tempfile::Builder::new()
        .prefix("sharp-web-upload-")
        .tempdir()
        .map_err(|e| ApiError::Internal(format!("Failed to create staging dir: {}", e)))?;

    let mut inputs = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let name = sanitize_file_name(&raw_name)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid file name: {:?}", raw_name)))?;
        let bytes = field.bytes().await?;

        let slot = staging.path().join(inputs.len().to_string());
        tokio::fs::create_dir(&slot)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {}", e)))?;
        let dest = slot.join(&name);
        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {}", e)))?;

        tracing::debug!(file = %name, size = bytes.len(), "Staged upload");
        inputs.push(dest);
    }

    tracing::info!(count = inputs.len(), "Received upload batch");
    let report = state
        .spawn_batch(inputs, Some(staging))
        .await
        .map_err(|e| ApiError::Internal(format!("Batch task failed: {}", e)))?;
    Ok(Json(GenerateResponse::from_report(state.output_root(), report)))
}

/// POST /api/generate/paths — Run images that are already on local disk.
async fn generate_paths(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GeneratePathsRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    tracing::info!(count = request.paths.len(), "Received path batch");
    let report = state
        .spawn_batch(request.paths, None)
        .await
        .map_err(|e| ApiError::Internal(format!("Batch task failed: {}", e)))?;
    Ok(Json(GenerateResponse::from_report(state.output_root(), report)))
}

/// Build the generate router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate_upload))
        .route("/generate/paths", post(generate_paths))
}
