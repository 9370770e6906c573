// crates/server/src/test_support.rs
//! Shared fixtures for handler tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sharp_web_core::{GeneratorConfig, Orchestrator, SplatTool, ToolError, ToolOutput};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::state::AppState;

pub const BOUNDARY: &str = "sharp-web-test-boundary";

/// Writes `<stem>.ply` into the job directory, or fails for stems
/// containing "fail".
pub struct StubTool;

#[async_trait]
impl SplatTool for StubTool {
    fn name(&self) -> &str {
        "mock"
    }

    async fn predict(&self, input: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.contains("fail") {
            return Err(ToolError::NonZeroExit {
                program: "mock".into(),
                exit_code: Some(1),
                stderr: "could not read image".into(),
            });
        }
        tokio::fs::write(output_dir.join(format!("{stem}.ply")), b"ply")
            .await
            .map_err(|source| ToolError::SpawnFailed {
                program: "mock".into(),
                source,
            })?;
        Ok(ToolOutput::default())
    }
}

/// State over a fresh temp dir holding `out/` and `assets/`.
pub fn test_state() -> (Arc<AppState>, TempDir) {
    let tmp = TempDir::new().unwrap();
    let assets = tmp.path().join("assets");
    std::fs::create_dir(&assets).unwrap();

    let config = GeneratorConfig::new(tmp.path().join("out"));
    let orchestrator = Orchestrator::new(config, Arc::new(StubTool)).unwrap();
    (AppState::new(orchestrator, assets), tmp)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, String::from_utf8(body).unwrap())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn post_json(
    app: Router,
    uri: &str,
    json: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    content_type: &str,
    body: Vec<u8>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Encode `(field, file_name, bytes)` parts as multipart/form-data.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (field, file_name, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Every path under `root`, sorted.
pub fn snapshot_tree(root: &Path) -> Vec<PathBuf> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, out);
            }
            out.push(path);
        }
    }
    let mut paths = Vec::new();
    walk(root, &mut paths);
    paths.sort();
    paths
}
