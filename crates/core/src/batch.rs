// crates/core/src/batch.rs
//! Sequential batches of generation jobs.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::create_archive;
use crate::job::GenerationOutcome;
use crate::orchestrator::Orchestrator;
use crate::preview::{render_preview, Preview};

pub const EMPTY_BATCH_MESSAGE: &str = "Please upload an image.";

/// Per-image progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BatchEvent {
    /// `index` is 1-based.
    Started { index: usize, total: usize, name: String },
    Finished {
        index: usize,
        total: usize,
        name: String,
        succeeded: bool,
        message: String,
    },
}

/// Everything the front-end needs after a batch completes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// One line per input, in input order.
    pub log: Vec<String>,
    pub outcomes: Vec<GenerationOutcome>,
    /// Produced model paths, in input order.
    pub models: Vec<PathBuf>,
    /// Set only when more than one model was produced.
    pub archive: Option<PathBuf>,
    pub archive_error: Option<String>,
    /// Initial selection: the first produced model.
    pub selection: Option<Preview>,
}

impl BatchReport {
    fn empty() -> Self {
        Self {
            log: vec![EMPTY_BATCH_MESSAGE.to_string()],
            outcomes: Vec::new(),
            models: Vec::new(),
            archive: None,
            archive_error: None,
            selection: None,
        }
    }

    pub fn log_text(&self) -> String {
        self.log.join("\n")
    }
}

impl Orchestrator {
    /// Run every input through [`Orchestrator::run_generation`], one at a
    /// time. A failed image never stops the rest of the batch.
    pub async fn run_batch<P, F>(&self, inputs: &[P], mut on_event: F) -> BatchReport
    where
        P: AsRef<Path>,
        F: FnMut(BatchEvent),
    {
        if inputs.is_empty() {
            return BatchReport::empty();
        }

        let total = inputs.len();
        let mut log = Vec::with_capacity(total);
        let mut outcomes = Vec::with_capacity(total);
        let mut models = Vec::new();

        for (i, input) in inputs.iter().enumerate() {
            let input = input.as_ref();
            let name = display_name(input);
            let index = i + 1;
            tracing::info!("[{}/{}] Processing {}...", index, total, name);
            on_event(BatchEvent::Started {
                index,
                total,
                name: name.clone(),
            });

            let outcome = self.run_generation(input).await;
            let line = match outcome.model_path() {
                Some(path) => {
                    models.push(path.to_path_buf());
                    format!("{name}: Success")
                }
                None => format!("{}: Failed ({})", name, outcome.message),
            };
            on_event(BatchEvent::Finished {
                index,
                total,
                name,
                succeeded: outcome.succeeded(),
                message: outcome.message.clone(),
            });
            log.push(line);
            outcomes.push(outcome);
        }

        let (archive, archive_error) = if models.len() > 1 {
            self.build_archive(&models).await
        } else {
            (None, None)
        };

        let selection = models
            .first()
            .and_then(|first| match render_preview(self.output_root(), Some(first)) {
                Ok(preview) => Some(preview),
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot render preview for first model");
                    None
                }
            });

        BatchReport {
            log,
            outcomes,
            models,
            archive,
            archive_error,
            selection,
        }
    }

    async fn build_archive(&self, models: &[PathBuf]) -> (Option<PathBuf>, Option<String>) {
        let archive_path = self.config().archive_path();
        let files = models.to_vec();
        let result =
            tokio::task::spawn_blocking(move || create_archive(&archive_path, &files)).await;

        match result {
            Ok(Ok(path)) => (Some(path), None),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Batch archive failed");
                (None, Some(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Batch archive task panicked");
                (None, Some(e.to_string()))
            }
        }
    }
}

fn display_name(input: &Path) -> String {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
