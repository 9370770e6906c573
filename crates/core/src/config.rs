// crates/core/src/config.rs
//! Generator configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the fixed output root when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_splats";

/// Job folders kept before the oldest are evicted.
pub const DEFAULT_MAX_GENERATIONS: usize = 50;

/// File name of the batch archive inside the output root.
pub const ARCHIVE_FILE_NAME: &str = "batch_results.zip";

/// How a job directory is named from its input image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobDirPolicy {
    /// `output_root/<base_name>/`. Inputs sharing a base name reuse the
    /// same directory.
    #[default]
    BaseName,
    /// `output_root/<base_name>-<8 hex chars>/`, fresh for every job.
    Unique,
}

/// Configuration for an [`crate::Orchestrator`] instance.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub output_root: PathBuf,
    pub max_generations: usize,
    /// Suffix a produced model file name must end with, e.g. `.ply`.
    pub model_extension: String,
    pub job_dir_policy: JobDirPolicy,
}

impl GeneratorConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_job_dir_policy(mut self, policy: JobDirPolicy) -> Self {
        self.job_dir_policy = policy;
        self
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_root.join(ARCHIVE_FILE_NAME)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_generations == 0 {
            return Err(ConfigError::ZeroMaxGenerations);
        }
        if self.model_extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_generations: DEFAULT_MAX_GENERATIONS,
            model_extension: ".ply".into(),
            job_dir_policy: JobDirPolicy::BaseName,
        }
    }
}
