// crates/core/src/test_support.rs
//! Stand-ins for the external generator, shared by unit tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tool::{SplatTool, ToolOutput};

#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Write `<stem>.ply` into the output directory and exit zero.
    WriteModel,
    /// Exit zero without writing anything.
    WriteNothing,
    Fail { stderr: String },
    SpawnFails,
}

/// Scripted [`SplatTool`]. Per-input overrides are matched on file stem.
pub struct MockTool {
    default: MockBehavior,
    overrides: Vec<(String, MockBehavior)>,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockTool {
    pub fn new(default: MockBehavior) -> Self {
        Self {
            default,
            overrides: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_override(mut self, stem: &str, behavior: MockBehavior) -> Self {
        self.overrides.push((stem.to_string(), behavior));
        self
    }

    /// Inputs seen so far, in call order.
    pub fn calls(&self) -> Arc<Mutex<Vec<PathBuf>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SplatTool for MockTool {
    fn name(&self) -> &str {
        "mock"
    }

    async fn predict(&self, input: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push(input.to_path_buf());

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let behavior = self
            .overrides
            .iter()
            .find(|(s, _)| *s == stem)
            .map(|(_, b)| b.clone())
            .unwrap_or_else(|| self.default.clone());

        match behavior {
            MockBehavior::WriteModel => {
                std::fs::write(output_dir.join(format!("{stem}.ply")), b"ply\n").unwrap();
                Ok(ToolOutput::default())
            }
            MockBehavior::WriteNothing => Ok(ToolOutput::default()),
            MockBehavior::Fail { stderr } => Err(ToolError::NonZeroExit {
                program: "mock".into(),
                exit_code: Some(1),
                stderr,
            }),
            MockBehavior::SpawnFails => Err(ToolError::SpawnFailed {
                program: "mock".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }),
        }
    }
}

/// A [`SharpCli`] that runs `body` as a shell script in place of `sharp`.
///
/// Positional arguments: `$1=predict $2=-i $3=<input> $4=-o $5=<output_dir>`.
/// The script is run through `sh` rather than exec'd directly, so it never
/// needs the executable bit.
#[cfg(unix)]
pub fn fake_sharp(dir: &Path, body: &str) -> crate::tool::SharpCli {
    let path = dir.join("fake-sharp.sh");
    std::fs::write(&path, format!("{body}\n")).unwrap();
    crate::tool::SharpCli::new("sh").with_leading_args([path.to_string_lossy().into_owned()])
}
