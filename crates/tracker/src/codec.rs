//! Document encoding.
//!
//! Both encodings produce UTF-8 JSON and decode identically; the choice only
//! affects how the document looks on disk.

use crate::error::{Error, ErrorKind, Result};
use crate::models::Document;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Serialization backend, fixed when the tracker is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Single-line JSON.
    #[default]
    #[serde(alias = "json")]
    Compact,
    /// Indented JSON, easier to inspect by hand.
    Pretty,
}
impl Encoding {
    pub fn encode(self, document: &Document) -> Result<Vec<u8>> {
        match self {
            Self::Compact => serde_json::to_vec(document),
            Self::Pretty => serde_json::to_vec_pretty(document),
        }
        .or_raise(|| ErrorKind::Encode)
    }
}
impl FromStr for Encoding {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" | "json" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => exn::bail!(ErrorKind::UnsupportedEncoding(s.to_string())),
        }
    }
}
impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Compact => write!(f, "compact"),
            Self::Pretty => write!(f, "pretty"),
        }
    }
}

/// Parse raw document bytes into an unvalidated JSON value.
pub(crate) fn decode(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).or_raise(|| ErrorKind::Parse)
}
