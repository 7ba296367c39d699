//! Config Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value is missing, has the wrong type, or the file could not be read.
    #[display("invalid configuration")]
    Load,
    /// The file extension does not name a known format.
    #[display("unsupported configuration format: {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    /// No home directory to derive the default config location from.
    #[display("could not determine configuration directory")]
    NoConfigDirectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::UnsupportedFormat("ini".to_string()).to_string(),
            "unsupported configuration format: ini"
        );
    }
}
