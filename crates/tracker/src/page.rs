//! Page numbers from image filenames.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use regex::Regex;
use std::sync::LazyLock;

// Leftmost run of digits followed by an extension: "12.png", "page-03.jpg".
static PAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?P<page>[0-9]+)\..+").unwrap());

/// Extract the page number from an image filename.
///
/// ```
/// use dltrack_tracker::page_number;
///
/// assert_eq!(page_number("12.png").unwrap(), 12);
/// assert_eq!(page_number("page-003.jpg").unwrap(), 3);
/// assert!(page_number("cover.png").is_err());
/// ```
///
/// # Errors
/// Returns [`ErrorKind::PageNumber`] when the filename has no digits before
/// an extension, or the number does not fit in a `u64`.
pub fn page_number(filename: &str) -> Result<u64> {
    PAGE_REGEX
        .captures(filename)
        .and_then(|captures| captures.name("page"))
        .and_then(|page| page.as_str().parse::<u64>().ok())
        .ok_or_raise(|| ErrorKind::PageNumber(filename.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.png", 1)]
    #[case("01.png", 1)]
    #[case("0010.jpeg", 10)]
    #[case("page-7.webp", 7)]
    #[case("Vol. 1 Ch. 20 - 5.png", 5)]
    #[case("3.tar.gz", 3)]
    fn test_page_number(#[case] filename: &str, #[case] expected: u64) {
        assert_eq!(page_number(filename).unwrap(), expected);
    }

    #[rstest]
    #[case("cover.png")]
    #[case("12")]
    #[case("12.")]
    #[case("")]
    #[case("99999999999999999999999.png")]
    fn test_no_page_number(#[case] filename: &str) {
        let err = page_number(filename).unwrap_err();
        assert_eq!(*err, ErrorKind::PageNumber(filename.to_string()));
    }
}
