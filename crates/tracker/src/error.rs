//! Tracker Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::ISSUES_URL;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A tracker error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A record is missing a required field, or a field has the wrong shape.
    #[display("malformed tracker record")]
    Structure,
    /// The tracker document is not valid JSON.
    #[display("tracker document could not be parsed")]
    Parse,
    /// The tracker could not be encoded for writing.
    #[display("tracker document could not be encoded")]
    Encode,
    /// The requested document encoding is not supported.
    #[display("unsupported encoding: {_0}")]
    UnsupportedEncoding(#[error(not(source))] String),
    /// An image filename does not carry a page number. This is a naming
    /// convention the tracker does not understand, not bad input data.
    #[display("could not determine page number from image filename '{_0}', please report it to {}", ISSUES_URL)]
    PageNumber(#[error(not(source))] String),
    /// No file with this name is tracked. Mutating an untracked file is a
    /// mistake in the calling code.
    #[display("file not tracked: {_0}")]
    NotTracked(#[error(not(source))] String),
    /// The file was added without per-page image tracking.
    #[display("file does not track images: {_0}")]
    ImagesNotTracked(#[error(not(source))] String),
    /// The file was added without per-chapter tracking.
    #[display("file does not track chapters: {_0}")]
    ChaptersNotTracked(#[error(not(source))] String),
    /// Reading, writing or deleting a file failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The background persistence worker rejected a job or failed to stop.
    #[display("persistence worker error")]
    Persistence,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
