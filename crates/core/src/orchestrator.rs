// crates/core/src/orchestrator.rs
//! Runs one image through the external generator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{GeneratorConfig, JobDirPolicy};
use crate::discovery::find_first_model;
use crate::error::{ConfigError, GenerationError, ToolError};
use crate::job::{GenerationJob, GenerationOutcome};
use crate::retention::{enforce_retention, RetentionOutcome};
use crate::tool::SplatTool;

/// Prepares job directories, invokes the tool, and finds its output.
///
/// Cheap to share behind an `Arc`; holds no per-job state.
pub struct Orchestrator {
    config: GeneratorConfig,
    tool: Arc<dyn SplatTool>,
}

impl Orchestrator {
    /// Validate `config` and create the output root if it is missing.
    pub fn new(config: GeneratorConfig, tool: Arc<dyn SplatTool>) -> Result<Self, ConfigError> {
        config.validate()?;
        std::fs::create_dir_all(&config.output_root).map_err(|source| ConfigError::OutputRoot {
            path: config.output_root.clone(),
            source,
        })?;
        Ok(Self { config, tool })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn output_root(&self) -> &Path {
        &self.config.output_root
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// Generate a model for one image.
    ///
    /// Always returns an outcome; the job's final status carries the model
    /// path or the failure message. Retention runs first, for every job that
    /// has an input, and its failure is only logged.
    pub async fn run_generation(&self, input: impl AsRef<Path>) -> GenerationOutcome {
        let input = input.as_ref();
        let mut job = GenerationJob::new(input);

        if input.as_os_str().is_empty() {
            let err = GenerationError::MissingInput;
            job.fail(err.to_string());
            return GenerationOutcome {
                job,
                message: err.to_string(),
                retention: RetentionOutcome::NotRun,
            };
        }

        let retention = self.run_retention().await;

        job.start();
        let result = self.generate(&mut job).await;
        let message = match result {
            Ok((model_path, message)) => {
                job.succeed(model_path);
                message
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(
                    input = %input.display(),
                    job_id = %job.job_id,
                    error = %message,
                    "Generation failed"
                );
                job.fail(message.clone());
                message
            }
        };

        GenerationOutcome {
            job,
            message,
            retention,
        }
    }

    async fn run_retention(&self) -> RetentionOutcome {
        let root = self.config.output_root.clone();
        let max = self.config.max_generations;
        let result = tokio::task::spawn_blocking(move || enforce_retention(&root, max)).await;

        match result {
            Ok(Ok(report)) => {
                if !report.removed.is_empty() {
                    tracing::info!(
                        removed = report.removed.len(),
                        "Retention pass removed old generations"
                    );
                }
                RetentionOutcome::Completed(report)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Cleanup failed (non-fatal)");
                RetentionOutcome::from(Err(e))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cleanup task panicked (non-fatal)");
                RetentionOutcome::Failed {
                    removed: Vec::new(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn generate(
        &self,
        job: &mut GenerationJob,
    ) -> Result<(PathBuf, String), GenerationError> {
        let base_name = job
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenerationError::InvalidInput {
                path: job.input.clone(),
            })?;

        job.job_id = self.job_id_for(&base_name);
        let job_dir = self.config.output_root.join(&job.job_id);
        tokio::fs::create_dir_all(&job_dir)
            .await
            .map_err(|e| GenerationError::system(format!("create {}", job_dir.display()), e))?;
        job.job_dir = Some(job_dir.clone());

        tracing::info!(job_id = %job.job_id, input = %job.input.display(), "Starting generation");

        self.tool
            .predict(&job.input, &job_dir)
            .await
            .map_err(|e| match e {
                ToolError::NonZeroExit {
                    exit_code, stderr, ..
                } => GenerationError::ToolFailed {
                    tool: self.tool.name().to_string(),
                    exit_code,
                    stderr,
                },
                spawn @ ToolError::SpawnFailed { .. } => GenerationError::System(spawn.to_string()),
            })?;

        let extension = self.config.model_extension.clone();
        let search_dir = job_dir.clone();
        let found = tokio::task::spawn_blocking(move || find_first_model(&search_dir, &extension))
            .await
            .map_err(|e| GenerationError::system("output scan", e))?;

        match found {
            Some(model_path) => {
                tracing::info!(
                    job_id = %job.job_id,
                    model = %model_path.display(),
                    "Generation complete"
                );
                let message = format!(
                    "Success! Generated {}{}",
                    base_name, self.config.model_extension
                );
                Ok((model_path, message))
            }
            None => Err(GenerationError::NoOutput {
                tool: self.tool.name().to_string(),
                extension: self.config.model_extension.clone(),
                job_id: job.job_id.clone(),
            }),
        }
    }

    fn job_id_for(&self, base_name: &str) -> String {
        match self.config.job_dir_policy {
            JobDirPolicy::BaseName => base_name.to_string(),
            JobDirPolicy::Unique => {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                format!("{}-{}", base_name, &suffix[..8])
            }
        }
    }
}
