use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A single downloaded page image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Filename of the image (for example `"12.png"`). The page number used
    /// for ordering is parsed from it.
    pub name: String,
    /// SHA-256 hex digest of the file contents.
    pub hash: String,
    /// Identifier of the chapter the page belongs to.
    pub chapter_id: String,
}
impl ImageInfo {
    pub fn new(name: impl Into<String>, hash: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            chapter_id: chapter_id.into(),
        }
    }

    /// Page number parsed from the filename.
    pub fn page(&self) -> crate::error::Result<u64> {
        crate::page::page_number(&self.name)
    }
}
impl TryFrom<Value> for ImageInfo {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).or_raise(|| ErrorKind::Structure)
    }
}
impl From<&ImageInfo> for Value {
    fn from(image: &ImageInfo) -> Self {
        json!({
            "name": image.name,
            "hash": image.hash,
            "chapter_id": image.chapter_id,
        })
    }
}
