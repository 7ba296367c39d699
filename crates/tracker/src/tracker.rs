//! The download tracker: in-memory ledger plus write-behind persistence.

use crate::codec::{self, Encoding};
use crate::error::{ErrorKind, Result};
use crate::load::{Validation, validate};
use crate::models::{ChapterInfo, Document, FileInfo, ImageInfo, NewFile};
use crate::persist::Persistence;
use crate::verify::verify_image;
use exn::{OptionExt, ResultExt};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// How a tracker is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Keep everything in memory: no file is read or written and no worker
    /// thread is started.
    pub disabled: bool,
    pub encoding: Encoding,
}

/// Tracks which files, pages and chapters of one output format have already
/// been downloaded, in `<directory>/downloaded-<format>.json`.
///
/// Every mutation updates memory immediately and queues a snapshot to be
/// written in the background. Call [`shutdown()`](Self::shutdown) (or drop
/// the tracker) to wait for those writes to finish.
///
/// # Examples
///
/// ```
/// use dltrack_tracker::{DownloadTracker, Options, models::NewFile};
///
/// # fn example() -> dltrack_tracker::error::Result<()> {
/// let directory = tempfile::tempdir().unwrap();
/// let mut tracker = DownloadTracker::open("raw", directory.path(), Options::default())?;
/// tracker.add_file(NewFile::new("Ch.1").with_id("abc").with_images())?;
/// tracker.add_image("Ch.1", "1.png", "h1", "abc")?;
/// tracker.set_completed("Ch.1", true)?;
/// assert!(tracker.is_completed("Ch.1"));
/// tracker.shutdown()?;
/// assert!(directory.path().join("downloaded-raw.json").exists());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct DownloadTracker {
    format: String,
    path: PathBuf,
    document: Document,
    /// `None` when tracking is disabled.
    persistence: Option<Persistence>,
}

impl DownloadTracker {
    /// Open (or create) the tracker for `format` in `directory`.
    ///
    /// Unless disabled, the directory is created if needed and the existing
    /// document is loaded and repaired:
    /// - a missing document is created empty,
    /// - a document that isn't valid JSON, or has no `files` array, is reset,
    /// - a record missing a field causes the whole tracker to be re-created,
    /// - later records sharing a name with an earlier one are dropped.
    ///
    /// The repaired document is written back immediately.
    #[instrument(skip_all, fields(format = %format, directory = %directory.as_ref().display()))]
    pub fn open(format: &str, directory: impl AsRef<Path>, options: Options) -> Result<Self> {
        let directory = directory.as_ref();
        let mut tracker = Self {
            format: format.to_string(),
            path: directory.join(format!("downloaded-{format}.json")),
            document: Document::default(),
            persistence: None,
        };
        if options.disabled {
            tracing::debug!("Download tracking disabled; nothing will be read or written");
            return Ok(tracker);
        }
        fs::create_dir_all(directory).or_raise(|| ErrorKind::Io(directory.to_path_buf()))?;
        tracker.persistence = Some(Persistence::start(
            format!("tracker-{format}"),
            tracker.path.clone(),
            options.encoding,
        )?);
        tracker.load()?;
        Ok(tracker)
    }

    fn load(&mut self) -> Result<()> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                self.document = Document::default();
                return self.persist();
            },
            Err(err) => return Err(err).or_raise(|| ErrorKind::Io(self.path.clone())),
        };
        let value = match codec::decode(&bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = ?err, "Unreadable tracker; starting fresh");
                self.document = Document::default();
                return self.persist();
            },
        };
        match validate(value, &self.path) {
            Validation::Valid(document) => {
                self.document = document;
                self.persist()
            },
            Validation::Malformed => {
                tracing::debug!(path = %self.path.display(), "Tracker has no file list; starting fresh");
                self.document = Document::default();
                self.persist()
            },
            Validation::Corrupt { .. } => self.reset(),
        }
    }

    /// Delete the backing file and start over with an empty document.
    fn reset(&mut self) -> Result<()> {
        self.document = Document::default();
        if let Some(persistence) = &self.persistence {
            persistence.delete()?;
            persistence.save(&self.document)?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        match &self.persistence {
            Some(persistence) => persistence.save(&self.document),
            None => Ok(()),
        }
    }

    /// Fails once the worker has been shut down, so mutations are rejected
    /// before memory is touched.
    fn ensure_writable(&self) -> Result<()> {
        match &self.persistence {
            Some(persistence) if !persistence.is_running() => exn::bail!(ErrorKind::Persistence),
            _ => Ok(()),
        }
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut FileInfo> {
        self.document
            .files
            .iter_mut()
            .rev()
            .find(|file| file.name == name)
            .ok_or_raise(|| ErrorKind::NotTracked(name.to_string()))
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Location of the backing document (whether or not it exists).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_disabled(&self) -> bool {
        self.persistence.is_none()
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.document.files
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// The tracked file with this name. If duplicates were added since the
    /// tracker was opened, the most recently added one is returned.
    pub fn get(&self, name: &str) -> Option<&FileInfo> {
        self.document.files.iter().rev().find(|file| file.name == name)
    }

    /// Returns `true` if the file is tracked and marked as completed.
    pub fn is_completed(&self, name: &str) -> bool {
        self.get(name).is_some_and(|file| file.completed)
    }

    /// The chapter identifiers from `ids` that are not yet recorded on the
    /// file. All of them if the file isn't tracked at all.
    pub fn new_chapters<'a>(&self, name: &str, ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        match self.get(name) {
            Some(file) => ids.into_iter().filter(|id| !file.has_chapter(id)).collect(),
            None => ids.into_iter().collect(),
        }
    }

    /// Recorded images of the file that are missing from `directory`, or
    /// whose contents no longer match the recorded hash.
    pub fn unverified_images(&self, name: &str, directory: impl AsRef<Path>) -> Vec<&ImageInfo> {
        let directory = directory.as_ref();
        self.get(name)
            .and_then(|file| file.images.as_ref())
            .map(|images| images.iter().filter(|image| !verify_image(image, directory)).collect())
            .unwrap_or_default()
    }

    /// Start tracking a file. Does not check whether the name is already
    /// tracked; duplicates are pruned the next time the tracker is opened.
    pub fn add_file(&mut self, file: NewFile) -> Result<&FileInfo> {
        self.ensure_writable()?;
        let index = self.document.files.len();
        self.document.files.push(FileInfo::from(file));
        self.persist()?;
        Ok(&self.document.files[index])
    }

    /// Stop tracking every file with this name. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> Result<usize> {
        self.ensure_writable()?;
        let before = self.document.files.len();
        self.document.files.retain(|file| file.name != name);
        let removed = before - self.document.files.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Record a downloaded page.
    ///
    /// # Errors
    /// - [`ErrorKind::NotTracked`] if no file has this name.
    /// - [`ErrorKind::ImagesNotTracked`] if the file does not track images.
    /// - [`ErrorKind::PageNumber`] if `image_name` has no page number. The
    ///   tracker is left unchanged.
    pub fn add_image(&mut self, name: &str, image_name: &str, hash: &str, chapter_id: &str) -> Result<()> {
        self.add_images(name, [ImageInfo::new(image_name, hash, chapter_id)])
    }

    /// Record several downloaded pages at once, with a single write.
    pub fn add_images(&mut self, name: &str, images: impl IntoIterator<Item = ImageInfo>) -> Result<()> {
        self.ensure_writable()?;
        self.get_mut(name)?.insert_images(images)?;
        self.persist()
    }

    /// Record a chapter bundled into an aggregate file. Returns `false`, and
    /// writes nothing, if the chapter id is already recorded.
    pub fn add_chapter(&mut self, name: &str, chapter_name: &str, chapter_id: &str) -> Result<bool> {
        Ok(self.add_chapters(name, [ChapterInfo::new(chapter_name, chapter_id)])? > 0)
    }

    /// Record several chapters at once. Returns how many were new.
    pub fn add_chapters(&mut self, name: &str, chapters: impl IntoIterator<Item = ChapterInfo>) -> Result<usize> {
        self.ensure_writable()?;
        let added = self.get_mut(name)?.insert_chapters(chapters)?;
        if added > 0 {
            self.persist()?;
        }
        Ok(added)
    }

    pub fn set_completed(&mut self, name: &str, is_complete: bool) -> Result<()> {
        self.ensure_writable()?;
        self.get_mut(name)?.completed = is_complete;
        self.persist()
    }

    /// Delete the backing file and start over with an empty tracker. Does
    /// nothing when tracking is disabled.
    pub fn recreate(&mut self) -> Result<()> {
        if self.is_disabled() {
            return Ok(());
        }
        self.ensure_writable()?;
        self.reset()
    }

    /// Wait for every queued write to finish and stop the worker thread.
    /// Calling this more than once is fine; mutations afterwards fail with
    /// [`ErrorKind::Persistence`].
    pub fn shutdown(&mut self) -> Result<()> {
        match self.persistence.as_mut() {
            Some(persistence) => persistence.shutdown(),
            None => Ok(()),
        }
    }
}
