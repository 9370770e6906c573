// crates/core/src/preview.rs
//! Preview and download references for a selected model.
//!
//! Pure string work over paths: nothing here touches the filesystem, so a
//! preview can be rendered any number of times without side effects.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::PreviewError;

/// URL prefix under which the output root is served.
pub const FILES_MOUNT: &str = "/files";

/// URL of the embedded splat viewer page.
pub const VIEWER_URL: &str = "/assets/viewer.html";

pub const PLACEHOLDER_HTML: &str = "<div style='height:600px; background:#000; color:#555; display:flex; align-items:center; justify-content:center;'>Select a model to preview</div>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub viewer_html: String,
    /// Absolute path of the selected model, `None` for the placeholder.
    pub download_path: Option<PathBuf>,
    pub download_url: Option<String>,
}

impl Preview {
    pub fn placeholder() -> Self {
        Self {
            viewer_html: PLACEHOLDER_HTML.to_string(),
            download_path: None,
            download_url: None,
        }
    }
}

/// Render the viewer iframe and download link for `selection`.
///
/// `None` or an empty path renders the placeholder. A path that does not
/// resolve lexically beneath `output_root` is rejected.
pub fn render_preview(
    output_root: &Path,
    selection: Option<&Path>,
) -> Result<Preview, PreviewError> {
    let Some(model_path) = selection.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(Preview::placeholder());
    };

    let download_url = file_url(output_root, model_path)?;
    let iframe_src = format!("{VIEWER_URL}?url={}", urlencoding::encode(&download_url));

    let viewer_html = format!(
        r#"<iframe
    src="{iframe_src}"
    width="100%"
    height="600px"
    style="border: 1px solid #444; border-radius: 8px; background: #000;"
    allow="camera; microphone; fullscreen; accelerometer; gyroscope; magnetometer"
></iframe>"#
    );

    Ok(Preview {
        viewer_html,
        download_path: Some(model_path.to_path_buf()),
        download_url: Some(download_url),
    })
}

/// `/files/<relative path>` for a file beneath `output_root`, each segment
/// percent-encoded.
pub fn file_url(output_root: &Path, path: &Path) -> Result<String, PreviewError> {
    let outside = || PreviewError::OutsideOutputRoot {
        path: path.to_path_buf(),
    };

    let relative = path.strip_prefix(output_root).map_err(|_| outside())?;
    let mut url = String::from(FILES_MOUNT);
    let mut segments = 0;
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                url.push('/');
                url.push_str(&urlencoding::encode(&segment.to_string_lossy()));
                segments += 1;
            }
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }
    if segments == 0 {
        return Err(outside());
    }
    Ok(url)
}
