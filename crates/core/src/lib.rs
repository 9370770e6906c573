// crates/core/src/lib.rs
//! Generation-job orchestration for the sharp web front-end.
//!
//! One [`Orchestrator`] owns the output root: it evicts old job folders,
//! shells out to the splat generator for each image, finds the produced
//! model, and bundles multi-image batches into a zip.

pub mod archive;
pub mod batch;
pub mod config;
pub mod discovery;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod preview;
pub mod retention;
pub mod tool;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{BatchEvent, BatchReport};
pub use config::{GeneratorConfig, JobDirPolicy};
pub use error::*;
pub use job::{GenerationJob, GenerationOutcome, JobStatus};
pub use orchestrator::Orchestrator;
pub use preview::{render_preview, Preview};
pub use retention::{enforce_retention, RetentionOutcome, RetentionReport};
pub use tool::{SharpCli, SplatTool, ToolOutput};
