// crates/core/src/discovery.rs
//! Locating produced model files on disk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// First file under `dir` whose name ends with `extension`.
///
/// Entries are visited depth-first with siblings sorted by file name, so the
/// result does not depend on the filesystem's enumeration order. Unreadable
/// subtrees are skipped.
pub fn find_first_model(dir: &Path, extension: &str) -> Option<PathBuf> {
    model_files(dir, extension).next()
}

/// Every model file under `output_root`, in sorted traversal order.
pub fn list_models(output_root: &Path, extension: &str) -> Vec<PathBuf> {
    model_files(output_root, extension).collect()
}

fn model_files<'a>(dir: &Path, extension: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(move |entry| entry.file_name().to_string_lossy().ends_with(extension))
        .map(|entry| entry.into_path())
}
