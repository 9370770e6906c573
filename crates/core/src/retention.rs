// crates/core/src/retention.rs
//! Bounded retention of job directories under the output root.
//!
//! Runs before every job. When the root already holds `max_generations` job
//! folders or more, the oldest are removed so that the folder about to be
//! created brings the count back to `max_generations`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use crate::error::RetentionError;

/// Result of a successful retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionReport {
    /// Job directories found before eviction.
    pub scanned: usize,
    /// Directories removed, oldest first.
    pub removed: Vec<PathBuf>,
}

/// What the retention step did for one job, as recorded on its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RetentionOutcome {
    /// The job never reached the retention step.
    NotRun,
    Completed(RetentionReport),
    Failed { removed: Vec<PathBuf>, error: String },
}

impl RetentionOutcome {
    pub fn removed(&self) -> &[PathBuf] {
        match self {
            Self::NotRun => &[],
            Self::Completed(report) => &report.removed,
            Self::Failed { removed, .. } => removed,
        }
    }
}

impl From<Result<RetentionReport, RetentionError>> for RetentionOutcome {
    fn from(result: Result<RetentionReport, RetentionError>) -> Self {
        match result {
            Ok(report) => Self::Completed(report),
            Err(err) => {
                let removed = match &err {
                    RetentionError::Remove { removed, .. } => removed.clone(),
                    RetentionError::List { .. } => Vec::new(),
                };
                Self::Failed {
                    removed,
                    error: err.to_string(),
                }
            }
        }
    }
}

/// Evict the oldest job directories under `output_root`.
///
/// Only real directories count; files such as the batch archive and
/// symlinks are left alone. Deletion is recursive. The first removal error
/// stops the pass.
///
/// Synchronous; call from `tokio::task::spawn_blocking` in async code.
pub fn enforce_retention(
    output_root: &Path,
    max_generations: usize,
) -> Result<RetentionReport, RetentionError> {
    let mut folders = list_job_dirs(output_root)?;
    folders.sort();

    let scanned = folders.len();
    let mut report = RetentionReport {
        scanned,
        removed: Vec::new(),
    };

    if scanned < max_generations {
        return Ok(report);
    }

    let num_to_delete = scanned + 1 - max_generations.max(1);
    tracing::info!(
        root = %output_root.display(),
        scanned,
        num_to_delete,
        "Retention: deleting old generations"
    );

    for (_, path) in folders.into_iter().take(num_to_delete) {
        tracing::debug!(path = %path.display(), "Retention: removing");
        if let Err(source) = fs::remove_dir_all(&path) {
            return Err(RetentionError::Remove {
                path,
                removed: report.removed,
                source,
            });
        }
        report.removed.push(path);
    }

    Ok(report)
}

/// Immediate subdirectories of `root`, keyed by creation time.
fn list_job_dirs(root: &Path) -> Result<Vec<(SystemTime, PathBuf)>, RetentionError> {
    let list_err = |source| RetentionError::List {
        path: root.to_path_buf(),
        source,
    };

    let mut folders = Vec::new();
    for entry in fs::read_dir(root).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let file_type = entry.file_type().map_err(list_err)?;
        if !file_type.is_dir() {
            continue;
        }
        let metadata = entry.metadata().map_err(list_err)?;
        folders.push((creation_time(&metadata), entry.path()));
    }
    Ok(folders)
}

/// Birth time where the filesystem records one, otherwise last modification.
fn creation_time(metadata: &fs::Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Create `count` job dirs named `job-000`, `job-001`, ... in creation order.
    fn make_job_dirs(root: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let dir = root.join(format!("job-{i:03}"));
                fs::create_dir(&dir).unwrap();
                fs::write(dir.join("model.ply"), b"ply").unwrap();
                // Distinct timestamps on coarse-grained filesystems.
                std::thread::sleep(Duration::from_millis(5));
                dir
            })
            .collect()
    }

    fn remaining_dirs(root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(root)
            .unwrap()
            .flatten()
            .filter(|e| e.file_type().unwrap().is_dir())
            .map(|e| e.path())
            .collect();
        dirs.sort();
        dirs
    }

    #[test]
    fn test_below_limit_removes_nothing() {
        let tmp = TempDir::new().unwrap();
        make_job_dirs(tmp.path(), 3);

        let report = enforce_retention(tmp.path(), 5).unwrap();
        assert_eq!(report.scanned, 3);
        assert!(report.removed.is_empty());
        assert_eq!(remaining_dirs(tmp.path()).len(), 3);
    }

    #[test]
    fn test_at_limit_removes_one() {
        let tmp = TempDir::new().unwrap();
        let dirs = make_job_dirs(tmp.path(), 4);

        let report = enforce_retention(tmp.path(), 4).unwrap();
        assert_eq!(report.removed, vec![dirs[0].clone()]);
        assert_eq!(remaining_dirs(tmp.path()), dirs[1..].to_vec());
    }

    #[test]
    fn test_fifty_two_dirs_leaves_forty_nine() {
        let tmp = TempDir::new().unwrap();
        let dirs = make_job_dirs(tmp.path(), 52);

        let report = enforce_retention(tmp.path(), 50).unwrap();
        assert_eq!(report.scanned, 52);
        assert_eq!(report.removed, dirs[..3].to_vec());

        let remaining = remaining_dirs(tmp.path());
        assert_eq!(remaining.len(), 49);
        assert_eq!(remaining, dirs[3..].to_vec());
    }

    #[test]
    fn test_oldest_selected_by_creation_not_name() {
        let tmp = TempDir::new().unwrap();
        let names = ["zebra", "apple", "mango"];
        for name in names {
            fs::create_dir(tmp.path().join(name)).unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }

        let report = enforce_retention(tmp.path(), 2).unwrap();
        assert_eq!(
            report.removed,
            vec![tmp.path().join("zebra"), tmp.path().join("apple")]
        );
        assert_eq!(remaining_dirs(tmp.path()), vec![tmp.path().join("mango")]);
    }

    #[test]
    fn test_files_in_root_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("batch_results.zip"), b"PK").unwrap();
        make_job_dirs(tmp.path(), 2);

        let report = enforce_retention(tmp.path(), 3).unwrap();
        assert_eq!(report.scanned, 2);
        assert!(tmp.path().join("batch_results.zip").exists());
    }

    #[test]
    fn test_missing_root_is_list_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let err = enforce_retention(&missing, 50).unwrap_err();
        assert!(matches!(err, RetentionError::List { .. }));

        let outcome = RetentionOutcome::from(Err(err));
        assert!(matches!(outcome, RetentionOutcome::Failed { .. }));
        assert!(outcome.removed().is_empty());
    }

    #[test]
    fn test_outcome_from_report() {
        let report = RetentionReport {
            scanned: 2,
            removed: vec![PathBuf::from("/out/a")],
        };
        let outcome = RetentionOutcome::from(Ok(report));
        assert_eq!(outcome.removed(), &[PathBuf::from("/out/a")]);
    }
}
