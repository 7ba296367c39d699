//! Queue Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A queue error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for queue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operating system refused to spawn the worker thread.
    #[display("could not spawn worker thread for queue '{_0}'")]
    Spawn(#[error(not(source))] String),
    /// The worker was never started, or has already been shut down.
    #[display("queue '{_0}' is not running")]
    NotRunning(#[error(not(source))] String),
    /// The worker thread itself died (jobs panicking are caught and do not
    /// trigger this).
    #[display("worker thread for queue '{_0}' panicked")]
    Panicked(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Spawn(_))
    }
}
