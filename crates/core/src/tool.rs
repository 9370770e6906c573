// crates/core/src/tool.rs
//! External splat generator invocation.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;

use crate::error::ToolError;

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An executable that turns one image into model files inside a directory.
///
/// Implementations must await the tool to completion. A zero exit maps to
/// `Ok`, anything else to [`ToolError::NonZeroExit`] carrying stderr.
#[async_trait]
pub trait SplatTool: Send + Sync {
    /// Display name used in status messages, e.g. "SHARP".
    fn name(&self) -> &str;

    async fn predict(&self, input: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError>;
}

/// The `sharp` command-line tool.
///
/// Command: `sharp [leading args..] predict -i <input> -o <output_dir>`
pub struct SharpCli {
    program: String,
    leading_args: Vec<String>,
}

impl SharpCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before `predict`, e.g. `["-m", "sharp"]` when the
    /// program is a Python interpreter.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for SharpCli {
    fn default() -> Self {
        Self::new("sharp")
    }
}

#[async_trait]
impl SplatTool for SharpCli {
    fn name(&self) -> &str {
        "SHARP"
    }

    async fn predict(&self, input: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError> {
        let t0 = std::time::Instant::now();
        tracing::info!(
            program = %self.program,
            input = %input.display(),
            output_dir = %output_dir.display(),
            "sharp: spawning"
        );

        let output = TokioCommand::new(&self.program)
            .args(&self.leading_args)
            .arg("predict")
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output_dir)
            // Null stdin so the child never blocks waiting for input
            .stdin(Stdio::null())
            // A dropped future must not leave the child writing into the job dir
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| {
                tracing::error!(
                    program = %self.program,
                    error = %source,
                    "sharp: failed to spawn process"
                );
                ToolError::SpawnFailed {
                    program: self.program.clone(),
                    source,
                }
            })?;

        let elapsed_ms = t0.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::error!(
                elapsed_ms,
                exit_code = ?output.status.code(),
                stderr = %&stderr[..floor_char_boundary(&stderr, 500)],
                "sharp: non-zero exit"
            );
            return Err(ToolError::NonZeroExit {
                program: self.program.clone(),
                exit_code: output.status.code(),
                stderr,
            });
        }

        tracing::info!(elapsed_ms, stdout_len = stdout.len(), "sharp: finished");
        Ok(ToolOutput { stdout, stderr })
    }
}

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
