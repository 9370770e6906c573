// crates/server/src/progress.rs
//! Atomic progress tracking for the batch currently running.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::RwLock;

use serde::Serialize;
use sharp_web_core::BatchEvent;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BatchStatus {
    Idle = 0,
    Running = 1,
    Completed = 2,
}

impl BatchStatus {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Idle),
            1 => Some(Self::Running),
            2 => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

/// Progress update sent via SSE.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgress {
    pub status: String,
    /// Images finished so far.
    pub current: u64,
    pub total: u64,
    pub message: Option<String>,
    pub timestamp: String,
}

/// Progress of one batch at a time.
///
/// Counters are lock-free atomics (except `message` which uses a RwLock)
/// so polling never blocks the batch.
pub struct BatchTracker {
    status: AtomicU8,
    current: AtomicU64,
    total: AtomicU64,
    message: RwLock<Option<String>>,
    progress_tx: broadcast::Sender<BatchProgress>,
}

impl BatchTracker {
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(64);
        Self {
            status: AtomicU8::new(BatchStatus::Idle as u8),
            current: AtomicU64::new(0),
            total: AtomicU64::new(0),
            message: RwLock::new(None),
            progress_tx,
        }
    }

    /// Reset counters for a new batch of `total` images.
    pub fn begin(&self, total: usize) {
        self.current.store(0, Ordering::Relaxed);
        self.total.store(total as u64, Ordering::Relaxed);
        self.status.store(BatchStatus::Running as u8, Ordering::Relaxed);
        self.write_message(None);
        self.broadcast_progress();
    }

    /// Fold one orchestrator event into the tracker and broadcast.
    pub fn record(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { index, total, name } => {
                self.write_message(Some(format!("[{index}/{total}] Processing {name}...")));
            }
            BatchEvent::Finished { index, name, message, .. } => {
                self.current.store(*index as u64, Ordering::Relaxed);
                self.write_message(Some(format!("{name}: {message}")));
            }
        }
        self.broadcast_progress();
    }

    pub fn complete(&self) {
        self.status.store(BatchStatus::Completed as u8, Ordering::Relaxed);
        self.broadcast_progress();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchProgress> {
        self.progress_tx.subscribe()
    }

    pub fn snapshot(&self) -> BatchProgress {
        BatchProgress {
            status: self.status().as_str().to_string(),
            current: self.current.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
            message: match self.message.read() {
                Ok(g) => g.clone(),
                Err(e) => {
                    tracing::error!("RwLock poisoned reading message: {e}");
                    None
                }
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn write_message(&self, msg: Option<String>) {
        match self.message.write() {
            Ok(mut guard) => *guard = msg,
            Err(e) => tracing::error!("RwLock poisoned writing message: {e}"),
        }
    }

    fn broadcast_progress(&self) {
        // No subscribers is fine.
        let _ = self.progress_tx.send(self.snapshot());
    }

    pub fn status(&self) -> BatchStatus {
        BatchStatus::from_u8(self.status.load(Ordering::Relaxed)).unwrap_or(BatchStatus::Completed)
    }
}

impl Default for BatchTracker {
    fn default() -> Self {
        Self::new()
    }
}
