// crates/core/src/archive.rs
//! Zip bundle of every model produced by a batch.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::ArchiveError;

/// Write `files` into a flat zip at `archive_path`, replacing any previous
/// archive. Entry names are the files' own names; a repeated name gets a
/// `-2`, `-3`, ... suffix before its extension.
///
/// The zip is built in a sibling temp file and renamed over `archive_path`
/// only once complete, so a failure leaves the previous archive intact.
///
/// Synchronous; call from `tokio::task::spawn_blocking` in async code.
pub fn create_archive(archive_path: &Path, files: &[PathBuf]) -> Result<PathBuf, ArchiveError> {
    let dir = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir).map_err(|e| ArchiveError::io(dir, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(staged));
    let options = SimpleFileOptions::default();

    let mut used = HashSet::new();
    for file in files {
        let name = unique_entry_name(file, &mut used);
        tracing::debug!(entry = %name, source = %file.display(), "Archiving model");

        zip.start_file(name, options)?;
        let mut src = File::open(file).map_err(|e| ArchiveError::io(file, e))?;
        std::io::copy(&mut src, &mut zip).map_err(|e| ArchiveError::io(file, e))?;
    }

    let staged = zip
        .finish()?
        .into_inner()
        .map_err(|e| ArchiveError::io(archive_path, e.into_error()))?;
    staged.as_file().sync_all().map_err(|e| ArchiveError::io(archive_path, e))?;
    staged
        .persist(archive_path)
        .map_err(|e| ArchiveError::io(archive_path, e.error))?;

    tracing::info!(
        archive = %archive_path.display(),
        entries = files.len(),
        "Batch archive written"
    );
    Ok(archive_path.to_path_buf())
}

fn unique_entry_name(file: &Path, used: &mut HashSet<String>) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name.as_str(), ""),
    };
    (2..)
        .map(|n| format!("{stem}-{n}{ext}"))
        .find(|candidate| used.insert(candidate.clone()))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn entry_names(archive: &Path) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_flat_entry_names() {
        let tmp = TempDir::new().unwrap();
        let mut files = Vec::new();
        for job in ["cat", "dog"] {
            let dir = tmp.path().join(job).join("nested");
            fs::create_dir_all(&dir).unwrap();
            let file = dir.join(format!("{job}.ply"));
            fs::write(&file, format!("ply {job}")).unwrap();
            files.push(file);
        }

        let archive = tmp.path().join("batch_results.zip");
        create_archive(&archive, &files).unwrap();

        assert_eq!(entry_names(&archive), vec!["cat.ply", "dog.ply"]);

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut body = String::new();
        zip.by_name("dog.ply").unwrap().read_to_string(&mut body).unwrap();
        assert_eq!(body, "ply dog");
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let tmp = TempDir::new().unwrap();
        let mut files = Vec::new();
        for job in ["cat-1", "cat-2"] {
            let dir = tmp.path().join(job);
            fs::create_dir(&dir).unwrap();
            let file = dir.join("cat.ply");
            fs::write(&file, b"ply").unwrap();
            files.push(file);
        }

        let archive = tmp.path().join("out.zip");
        create_archive(&archive, &files).unwrap();

        assert_eq!(entry_names(&archive), vec!["cat.ply", "cat-2.ply"]);
    }

    #[test]
    fn test_overwrites_previous_archive() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.ply");
        let b = tmp.path().join("b.ply");
        fs::write(&a, b"ply").unwrap();
        fs::write(&b, b"ply").unwrap();
        let archive = tmp.path().join("batch_results.zip");

        create_archive(&archive, &[a.clone(), b]).unwrap();
        create_archive(&archive, &[a]).unwrap();

        assert_eq!(entry_names(&archive), vec!["a.ply"]);
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("batch_results.zip");
        let err = create_archive(&archive, &[tmp.path().join("gone.ply")]).unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
    }

    #[test]
    fn test_failed_rewrite_keeps_previous_archive() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.ply");
        let b = tmp.path().join("b.ply");
        fs::write(&a, b"ply").unwrap();
        fs::write(&b, b"ply").unwrap();
        let archive = tmp.path().join("batch_results.zip");
        create_archive(&archive, &[a.clone(), b]).unwrap();

        let err = create_archive(&archive, &[a, tmp.path().join("gone.ply")]).unwrap_err();

        assert!(matches!(err, ArchiveError::Io { .. }));
        assert_eq!(entry_names(&archive), vec!["a.ply", "b.ply"]);
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .filter(|e| e.path().extension().is_none())
            .collect();
        assert!(leftovers.is_empty(), "temp file left behind: {leftovers:?}");
    }
}
