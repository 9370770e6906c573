// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a single generation job.
///
/// The `Display` text of each variant is the status message shown to the
/// user, so the wording is part of the contract.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Error: no input image was provided.")]
    MissingInput,

    #[error("Error: {path} does not name an image file.")]
    InvalidInput { path: PathBuf },

    #[error("Error running {tool}:\n{stderr}")]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Error: {tool} finished, but no {extension} file was found in {job_id}.")]
    NoOutput {
        tool: String,
        extension: String,
        job_id: String,
    },

    #[error("System Error: {0}")]
    System(String),
}

impl GenerationError {
    pub fn system(context: impl std::fmt::Display, source: impl std::fmt::Display) -> Self {
        Self::System(format!("{context}: {source}"))
    }
}

/// Errors reported by a [`crate::SplatTool`] invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {exit_code:?}")]
    NonZeroExit {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Errors from a retention pass over the output root.
#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("Cannot list output root {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot remove {path} ({} removed before failure): {source}", removed.len())]
    Remove {
        path: PathBuf,
        removed: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

/// Errors while bundling produced models into the batch archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error writing archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ArchiveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors rendering a preview for a selected model.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Model path is outside the output root: {path}")]
    OutsideOutputRoot { path: PathBuf },
}

/// Invalid generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_generations must be at least 1")]
    ZeroMaxGenerations,

    #[error("model extension must not be empty")]
    EmptyExtension,

    #[error("Cannot create output root {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
