//! Discovered storage entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path;

// ============================================================================
// Blob Kind
// ============================================================================

/// Kind of a discovered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    /// A leaf object carrying data.
    File,
    /// A container of other entries. Has no size.
    Folder,
}

// ============================================================================
// Blob
// ============================================================================

/// A discovered storage object, file or folder, identified by its full
/// normalized path.
///
/// Attributes beyond the path are optional: backends populate size and
/// timestamps when cheaply available, and `metadata` only when the caller
/// asked for attributes (`ListOptions::include_attributes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Full normalized path of this entry.
    pub path: String,
    /// File or folder.
    pub kind: BlobKind,
    /// Size in bytes. Folders have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Creation time, when the backend tracks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time, when the backend tracks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Backend-defined attributes, ordered by key. Populated lazily.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Blob {
    /// Create a file entry at the given path.
    pub fn file(full_path: impl AsRef<str>) -> Self {
        Self::new(full_path, BlobKind::File)
    }

    /// Create a folder entry at the given path.
    pub fn folder(full_path: impl AsRef<str>) -> Self {
        Self::new(full_path, BlobKind::Folder)
    }

    fn new(full_path: impl AsRef<str>, kind: BlobKind) -> Self {
        Self {
            path: path::normalize(full_path.as_ref()),
            kind,
            size: None,
            created_at: None,
            modified_at: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Set the size in bytes.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Name of this entry: the last path segment, or empty for the root.
    pub fn name(&self) -> String {
        path::name(&self.path).unwrap_or_default()
    }

    /// True for folder entries.
    pub fn is_folder(&self) -> bool {
        self.kind == BlobKind::Folder
    }
}

impl std::fmt::Display for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            BlobKind::File => write!(f, "{}", self.path),
            BlobKind::Folder => write!(f, "{}/", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_normalizes_path() {
        let blob = Blob::file("a//b/file.txt");
        assert_eq!(blob.path, "/a/b/file.txt");
        assert_eq!(blob.name(), "file.txt");
        assert!(!blob.is_folder());
    }

    #[test]
    fn folder_has_no_size() {
        let blob = Blob::folder("/data");
        assert!(blob.is_folder());
        assert_eq!(blob.size, None);
        assert_eq!(blob.to_string(), "/data/");
    }
}
