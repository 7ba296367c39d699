//! Validation of tracker documents read from disk.
//!
//! Repair is coarse-grained: duplicate names are pruned (first occurrence
//! wins), but a single record that cannot be built invalidates the whole
//! document.

use crate::models::{Document, FileInfo};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Outcome of [`validate()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The document is usable as-is, minus any dropped duplicates.
    Valid(Document),
    /// The root is not an object with a `files` array.
    Malformed,
    /// The record at `index` is missing a field or has the wrong shape. The
    /// whole tracker has to be re-created.
    Corrupt { index: usize },
}

/// Validate a parsed document. `path` is only used in log events.
pub fn validate(value: Value, path: &Path) -> Validation {
    let Value::Object(mut root) = value else {
        return Validation::Malformed;
    };
    let Some(Value::Array(entries)) = root.remove("files") else {
        return Validation::Malformed;
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let mut files = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let file = match FileInfo::try_from(entry) {
            Ok(file) => file,
            Err(err) => {
                tracing::error!(
                    path = %path.display(),
                    index,
                    error = ?err,
                    "Malformed tracker file structure; re-creating tracker"
                );
                return Validation::Corrupt { index };
            },
        };
        if !seen.insert(file.name.clone()) {
            tracing::warn!(path = %path.display(), index, name = %file.name, "Duplicate found in tracker; removing");
            continue;
        }
        files.push(file);
    }
    Validation::Valid(Document::new(files))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageInfo, NewFile};
    use rstest::rstest;
    use serde_json::json;

    fn entry(name: &str, id: &str) -> Value {
        json!({"name": name, "id": id, "hash": null, "completed": false, "images": null, "chapters": null})
    }

    fn valid(value: Value) -> Document {
        match validate(value, Path::new("downloaded-raw.json")) {
            Validation::Valid(document) => document,
            other => panic!("expected a valid document, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document() {
        let document = valid(json!({"comment": [], "files": []}));
        assert_eq!(document, Document::default());
    }

    #[test]
    fn test_comment_is_optional() {
        let document = valid(json!({"files": [entry("Ch.1", "a")]}));
        assert_eq!(document.files.len(), 1);
        assert_eq!(document.comment, Document::default().comment);
    }

    #[rstest]
    #[case(json!({"comment": ["DO NOT EDIT THIS FILE"]}))]
    #[case(json!({"files": null}))]
    #[case(json!({"files": {"name": "Ch.1"}}))]
    #[case(json!([]))]
    #[case(json!(null))]
    fn test_malformed_root(#[case] value: Value) {
        assert_eq!(validate(value, Path::new("t.json")), Validation::Malformed);
    }

    #[test]
    fn test_duplicates_first_occurrence_wins() {
        let document = valid(json!({"files": [entry("X", "first"), entry("Y", "y"), entry("X", "second")]}));
        let names: Vec<_> = document.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert_eq!(document.files[0].id.as_deref(), Some("first"));
    }

    #[test]
    fn test_missing_field_is_corrupt() {
        let mut broken = entry("Ch.2", "b");
        broken.as_object_mut().unwrap().remove("id");
        let value = json!({"files": [entry("Ch.1", "a"), broken, entry("Ch.3", "c")]});
        assert_eq!(validate(value, Path::new("t.json")), Validation::Corrupt { index: 1 });
    }

    #[test]
    fn test_round_trip() {
        let mut raw = FileInfo::from(NewFile::new("Ch.1").with_id("abc").with_images());
        raw.insert_images([ImageInfo::new("1.png", "h1", "abc"), ImageInfo::new("2.png", "h2", "abc")]).unwrap();
        raw.completed = true;
        let simple = FileInfo::from(NewFile::new("Ch.2.cbz").with_id("def").with_hash("h"));
        let document = Document::new(vec![raw, simple]);

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(valid(value), document);
    }
}
