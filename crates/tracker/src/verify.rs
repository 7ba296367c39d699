//! Content hashes for downloaded files.

use crate::error::{ErrorKind, Result};
use crate::models::ImageInfo;
use exn::ResultExt;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// SHA-256 of a file's contents as lowercase hex, the format recorded in
/// [`ImageInfo::hash`] and [`FileInfo::hash`](crate::models::FileInfo::hash).
pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Returns `true` if the image exists under `directory` and its contents
/// still match the recorded hash.
pub fn verify_image(image: &ImageInfo, directory: &Path) -> bool {
    let path = directory.join(&image.name);
    match hash_file(&path) {
        Ok(hash) if hash == image.hash => true,
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Image hash does not match tracker");
            false
        },
        Err(_) => {
            tracing::debug!(path = %path.display(), "Image missing or unreadable");
            false
        },
    }
}
