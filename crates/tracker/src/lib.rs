//! Persistent ledger of completed downloads.
//!
//! One JSON document per output format records which files, pages and
//! chapters have already been downloaded, so an interrupted run can resume
//! without fetching them again. The document is the source of truth only for
//! progress: it never holds image data, and it can be deleted at any time at
//! the cost of re-downloading.
//!
//! # Architecture
//! - [`DownloadTracker`] owns the in-memory [`Document`](models::Document)
//!   and answers queries synchronously.
//! - Every mutation hands an owned snapshot to a background
//!   [`QueueWorker`](dltrack_queue::QueueWorker), which writes it atomically.
//!   Snapshots superseded before they run are skipped.
//! - On open, [`validate()`] repairs what it can (duplicate names) and asks
//!   for a re-create when it can't (records missing fields).

pub mod codec;
pub mod error;
pub mod load;
pub mod models;
mod page;
mod persist;
mod tracker;
mod verify;

pub use crate::codec::Encoding;
pub use crate::load::{Validation, validate};
pub use crate::page::page_number;
pub use crate::tracker::{DownloadTracker, Options};
pub use crate::verify::{hash_file, verify_image};

pub const ISSUES_URL: &str = "https://github.com/mansuf/mangadex-downloader/issues";
