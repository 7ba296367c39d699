//! Write-behind persistence.
//!
//! Every save enqueues an owned snapshot of the document on a
//! [`QueueWorker`]. Snapshots carry a generation number; when a job runs and
//! a newer snapshot has already been queued behind it, the write is skipped.
//! FIFO ordering guarantees the newest snapshot always lands last.

use crate::codec::Encoding;
use crate::error::{ErrorKind, Result};
use crate::models::Document;
use dltrack_queue::QueueWorker;
use exn::ResultExt;
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::NamedTempFile;

pub(crate) struct Persistence {
    worker: QueueWorker,
    path: PathBuf,
    encoding: Encoding,
    /// Generation of the most recently queued snapshot.
    latest: Arc<AtomicU64>,
}
impl Persistence {
    pub(crate) fn start(name: impl Into<String>, path: PathBuf, encoding: Encoding) -> Result<Self> {
        let mut worker = QueueWorker::new(name);
        worker.start().or_raise(|| ErrorKind::Persistence)?;
        Ok(Self {
            worker,
            path,
            encoding,
            latest: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Queue a write of the document as it is right now.
    pub(crate) fn save(&self, document: &Document) -> Result<()> {
        let snapshot = document.clone();
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.latest);
        let path = self.path.clone();
        let encoding = self.encoding;
        self.worker
            .submit(move || {
                if latest.load(Ordering::Acquire) != generation {
                    tracing::trace!(generation, "Skipping superseded tracker snapshot");
                    return;
                }
                if let Err(err) = write_atomic(&path, &snapshot, encoding) {
                    tracing::error!(path = %path.display(), error = ?err, "Failed to write tracker");
                }
            })
            .or_raise(|| ErrorKind::Persistence)
    }

    /// Queue removal of the backing file, ordered with respect to writes.
    pub(crate) fn delete(&self) -> Result<()> {
        let path = self.path.clone();
        self.worker
            .submit(move || {
                if let Err(err) = delete_file(&path) {
                    tracing::error!(path = %path.display(), error = ?err, "Failed to delete tracker");
                }
            })
            .or_raise(|| ErrorKind::Persistence)
    }

    /// Whether new saves and deletes are still accepted.
    pub(crate) fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Block until every queued job has run, then stop the worker.
    pub(crate) fn shutdown(&mut self) -> Result<()> {
        self.worker.shutdown().or_raise(|| ErrorKind::Persistence)
    }
}

/// Encode and write via a temporary file in the same directory, so readers
/// never observe a half-written document.
pub(crate) fn write_atomic(path: &Path, document: &Document, encoding: Encoding) -> Result<()> {
    let bytes = encoding.encode(document)?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    file.write_all(&bytes).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    file.persist(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    Ok(())
}

/// Remove a file; a file that is already gone is not an error.
pub(crate) fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == IoErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).or_raise(|| ErrorKind::Io(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::models::{FileInfo, NewFile};

    fn document(names: &[&str]) -> Document {
        Document::new(names.iter().map(|name| FileInfo::from(NewFile::new(*name))).collect())
    }

    #[test]
    fn test_write_atomic() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("downloaded-raw.json");
        write_atomic(&path, &document(&["Ch.1"]), Encoding::Compact).unwrap();
        let value = decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::to_value(document(&["Ch.1"])).unwrap());
        // Overwrites in place, leaving no temporary files behind.
        write_atomic(&path, &document(&["Ch.2"]), Encoding::Compact).unwrap();
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing/downloaded-raw.json");
        let err = write_atomic(&path, &Document::default(), Encoding::Compact).unwrap_err();
        assert_eq!(*err, ErrorKind::Io(path));
    }

    #[test]
    fn test_delete_file_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("downloaded-raw.json");
        fs::write(&path, b"{}").unwrap();
        delete_file(&path).unwrap();
        assert!(!path.exists());
        delete_file(&path).unwrap();
    }

    #[test]
    fn test_last_snapshot_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("downloaded-raw.json");
        let mut persistence = Persistence::start("test", path.clone(), Encoding::Compact).unwrap();
        let mut names = Vec::new();
        let owned: Vec<String> = (0..100).map(|n| format!("Ch.{n}")).collect();
        for name in &owned {
            names.push(name.as_str());
            persistence.save(&document(&names)).unwrap();
        }
        persistence.shutdown().unwrap();
        let value = decode(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::to_value(document(&names)).unwrap());
    }

    #[test]
    fn test_delete_is_ordered_with_writes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("downloaded-raw.json");
        let mut persistence = Persistence::start("test", path.clone(), Encoding::Compact).unwrap();
        persistence.save(&document(&["Ch.1"])).unwrap();
        persistence.delete().unwrap();
        persistence.shutdown().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_save_after_shutdown_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("downloaded-raw.json");
        let mut persistence = Persistence::start("test", path, Encoding::Compact).unwrap();
        persistence.shutdown().unwrap();
        persistence.shutdown().unwrap();
        let err = persistence.save(&Document::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::Persistence);
    }
}
