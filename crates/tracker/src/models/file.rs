use crate::error::{Error, ErrorKind, Result as TrackerResult};
use crate::models::{ChapterInfo, ImageInfo};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The tracked unit: one output file, volume or chapter directory.
///
/// Which of `images` and `chapters` is populated depends on the output
/// format:
/// - per-page raw formats track `images`,
/// - aggregate formats (volumes, single files) track `chapters`,
/// - simple single-file formats leave both as `None`.
///
/// Every key must be present in the document, even when its value is
/// `null`; the `deserialize_with` attributes stop serde from treating a
/// missing key as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Primary key within the tracker.
    pub name: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub id: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub hash: Option<String>,
    pub completed: bool,
    #[serde(deserialize_with = "Option::deserialize")]
    pub images: Option<Vec<ImageInfo>>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub chapters: Option<Vec<ChapterInfo>>,
}
impl FileInfo {
    /// Returns `true` if a chapter with this identifier is recorded.
    pub fn has_chapter(&self, id: &str) -> bool {
        self.chapters.as_ref().is_some_and(|chapters| chapters.iter().any(|c| c.id == id))
    }

    /// Record images, replacing any structurally equal entries, then re-sort
    /// the whole sequence by page number.
    ///
    /// Page numbers are resolved before anything is changed, so a filename
    /// without a page number leaves the record untouched.
    ///
    /// # Errors
    /// - [`ErrorKind::ImagesNotTracked`] if this file was added without image
    ///   tracking.
    /// - [`ErrorKind::PageNumber`] if any filename has no page number.
    pub fn insert_images(&mut self, new: impl IntoIterator<Item = ImageInfo>) -> TrackerResult<()> {
        let Some(existing) = self.images.as_ref() else {
            exn::bail!(ErrorKind::ImagesNotTracked(self.name.clone()));
        };
        let mut images = existing.clone();
        for image in new {
            images.retain(|i| i != &image);
            images.push(image);
        }
        let mut paged = images
            .into_iter()
            .map(|image| image.page().map(|page| (page, image)))
            .collect::<TrackerResult<Vec<_>>>()?;
        // Stable, so pages sharing a number keep their insertion order.
        paged.sort_by_key(|(page, _)| *page);
        self.images = Some(paged.into_iter().map(|(_, image)| image).collect());
        Ok(())
    }

    /// Record chapters whose identifiers are not already present. Returns
    /// how many were actually added.
    ///
    /// # Errors
    /// Returns [`ErrorKind::ChaptersNotTracked`] if this file was added
    /// without chapter tracking.
    pub fn insert_chapters(&mut self, new: impl IntoIterator<Item = ChapterInfo>) -> TrackerResult<usize> {
        let Some(chapters) = self.chapters.as_mut() else {
            exn::bail!(ErrorKind::ChaptersNotTracked(self.name.clone()));
        };
        let before = chapters.len();
        for chapter in new {
            if !chapters.iter().any(|c| c.id == chapter.id) {
                chapters.push(chapter);
            }
        }
        Ok(chapters.len() - before)
    }
}
impl TryFrom<Value> for FileInfo {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).or_raise(|| ErrorKind::Structure)
    }
}
impl From<&FileInfo> for Value {
    fn from(file: &FileInfo) -> Self {
        json!({
            "name": file.name,
            "id": file.id,
            "hash": file.hash,
            "completed": file.completed,
            "images": file.images.as_ref().map(|images| images.iter().map(Value::from).collect::<Vec<_>>()),
            "chapters": file.chapters.as_ref().map(|chapters| chapters.iter().map(Value::from).collect::<Vec<_>>()),
        })
    }
}

/// Description of a file about to be tracked.
///
/// ```
/// use dltrack_tracker::models::{FileInfo, NewFile};
///
/// let file = FileInfo::from(NewFile::new("Vol. 1 Ch. 20").with_id("a2f32e55").with_images());
/// assert!(!file.completed);
/// assert_eq!(file.images, Some(vec![]));
/// assert_eq!(file.chapters, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    name: String,
    id: Option<String>,
    hash: Option<String>,
    images: bool,
    chapters: bool,
}
impl NewFile {
    /// A file tracking neither images nor chapters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            hash: None,
            images: false,
            chapters: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Track per-page images (raw formats).
    pub fn with_images(mut self) -> Self {
        self.images = true;
        self
    }

    /// Track bundled chapters (volume and single-file formats).
    pub fn with_chapters(mut self) -> Self {
        self.chapters = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
impl From<NewFile> for FileInfo {
    fn from(new: NewFile) -> Self {
        Self {
            name: new.name,
            id: new.id,
            hash: new.hash,
            completed: false,
            images: new.images.then(Vec::new),
            chapters: new.chapters.then(Vec::new),
        }
    }
}
