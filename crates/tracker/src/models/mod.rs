mod chapter;
mod document;
mod file;
mod image;

pub use self::chapter::ChapterInfo;
pub use self::document::{COMMENT, Document};
pub use self::file::{FileInfo, NewFile};
pub use self::image::ImageInfo;
