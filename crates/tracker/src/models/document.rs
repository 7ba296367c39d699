use crate::models::FileInfo;
use serde::Serialize;

/// Informational header written at the top of every tracker document.
pub const COMMENT: [&str; 2] = ["DO NOT EDIT THIS FILE", "UNLESS YOU KNOW WHAT YOU'RE DOING"];

/// Root of a tracker document.
///
/// Not `Deserialize`: documents read from disk go
/// through [`validate()`](crate::load::validate), which repairs what it can.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub comment: Vec<String>,
    pub files: Vec<FileInfo>,
}
impl Document {
    pub fn new(files: Vec<FileInfo>) -> Self {
        Self {
            comment: COMMENT.iter().map(|line| line.to_string()).collect(),
            files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
