// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use sharp_web_core::{BatchReport, Orchestrator};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::progress::BatchTracker;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    pub orchestrator: Orchestrator,
    /// Directory served under `/assets` (viewer.html).
    pub assets_dir: PathBuf,
    pub progress: Arc<BatchTracker>,
    /// Held for the whole of a batch so jobs never overlap.
    batch_lock: Mutex<()>,
}

/// Marks the tracker completed when dropped, whether the batch returned or
/// panicked.
struct CompleteOnDrop(Arc<BatchTracker>);

impl Drop for CompleteOnDrop {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, assets_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            orchestrator,
            assets_dir: assets_dir.into(),
            progress: Arc::new(BatchTracker::new()),
            batch_lock: Mutex::new(()),
        })
    }

    pub fn output_root(&self) -> &Path {
        self.orchestrator.output_root()
    }

    /// Start a batch on its own task, queued behind any batch in flight.
    ///
    /// The task owns `staging` (the directory holding uploaded inputs) and
    /// the batch lock, so dropping the returned handle, e.g. when the client
    /// disconnects, never cuts the batch short.
    pub fn spawn_batch(
        self: &Arc<Self>,
        inputs: Vec<PathBuf>,
        staging: Option<TempDir>,
    ) -> JoinHandle<BatchReport> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = state.batch_lock.lock().await;

            state.progress.begin(inputs.len());
            let _complete = CompleteOnDrop(Arc::clone(&state.progress));
            let progress = Arc::clone(&state.progress);
            let report = state
                .orchestrator
                .run_batch(&inputs, move |event| progress.record(&event))
                .await;

            drop(staging);
            report
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
