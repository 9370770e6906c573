// crates/core/src/job.rs
//! Types for a single generation job.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::retention::RetentionOutcome;

/// Lifecycle of one job: `Pending -> Running -> {Succeeded, Failed}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobStatus {
    Pending,
    Running,
    #[serde(rename_all = "camelCase")]
    Succeeded { model_path: PathBuf },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// A job for one input image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub input: PathBuf,
    /// Directory name under the output root; empty until derived.
    pub job_id: String,
    pub job_dir: Option<PathBuf>,
    pub status: JobStatus,
}

impl GenerationJob {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            job_id: String::new(),
            job_dir: None,
            status: JobStatus::Pending,
        }
    }

    /// Move to `Running`. Only valid from `Pending`.
    pub fn start(&mut self) {
        debug_assert_eq!(self.status, JobStatus::Pending);
        self.status = JobStatus::Running;
    }

    pub fn succeed(&mut self, model_path: PathBuf) {
        self.status = JobStatus::Succeeded { model_path };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed {
            message: message.into(),
        };
    }
}

/// What `run_generation` hands back for one input. Never an error: every
/// failure has already been turned into `message`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub job: GenerationJob,
    pub message: String,
    pub retention: RetentionOutcome,
}

impl GenerationOutcome {
    pub fn model_path(&self) -> Option<&Path> {
        match &self.job.status {
            JobStatus::Succeeded { model_path } => Some(model_path),
            _ => None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.model_path().is_some()
    }
}
