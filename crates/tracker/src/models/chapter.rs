use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A chapter bundled into an aggregate (volume or single-file) output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterInfo {
    /// Display name of the chapter.
    pub name: String,
    pub id: String,
}
impl ChapterInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self { name: name.into(), id: id.into() }
    }
}
impl TryFrom<Value> for ChapterInfo {
    type Error = Error;
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value).or_raise(|| ErrorKind::Structure)
    }
}
impl From<&ChapterInfo> for Value {
    fn from(chapter: &ChapterInfo) -> Self {
        json!({
            "name": chapter.name,
            "id": chapter.id,
        })
    }
}
