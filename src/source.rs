//! Identity of the loaded document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Url,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::File => f.write_str("file"),
            SourceKind::Url => f.write_str("url"),
        }
    }
}

/// Spec source descriptor.
///
/// `name` is the identity that scopes saved test sessions; loading a document
/// under a different name discards the previous name's sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSource {
    pub kind: SourceKind,

    /// Canonical path or URL
    pub name: String,

    /// `ETag` of a fetched document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// `Last-Modified` of a fetched document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl SpecSource {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::File,
            name: name.into(),
            etag: None,
            last_modified: None,
        }
    }

    pub fn url(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Url,
            name: name.into(),
            etag: None,
            last_modified: None,
        }
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}
