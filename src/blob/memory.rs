//! In-memory blob storage backend.
//!
//! Stores file content in a flat concurrent map keyed by normalized path.
//! Folders are implicit: they exist exactly while something lives under
//! them, and one-level listing synthesizes folder entries from key
//! prefixes. Deliberately reports `can_list_hierarchy = false` so the
//! generic listing engine drives the recursion, which also makes this the
//! reference backend for traversal tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::path;

use super::entry::{Blob, BlobKind};
use super::error::{StorageError, StorageResult};
use super::list::ListOptions;
use super::storage::BlobStorage;

// ============================================================================
// Stored Entry
// ============================================================================

#[derive(Clone)]
struct StoredFile {
    data: Vec<u8>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    metadata: BTreeMap<String, String>,
}

impl StoredFile {
    fn to_blob(&self, full_path: &str, include_attributes: bool) -> Blob {
        let mut blob = Blob::file(full_path).with_size(self.data.len() as u64);
        blob.created_at = Some(self.created_at);
        blob.modified_at = Some(self.modified_at);
        if include_attributes {
            blob.metadata = self.metadata.clone();
        }
        blob
    }
}

// ============================================================================
// In-Memory Storage
// ============================================================================

/// Blob storage held entirely in process memory.
#[derive(Default)]
pub struct InMemoryBlobStorage {
    files: DashMap<String, StoredFile>,
}

impl InMemoryBlobStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn folder_exists(&self, folder: &str) -> bool {
        if path::is_root(folder) {
            return true;
        }
        let prefix = format!("{folder}/");
        self.files.iter().any(|e| e.key().starts_with(&prefix))
    }
}

#[async_trait]
impl BlobStorage for InMemoryBlobStorage {
    async fn list_at(&self, folder_path: &str, options: &ListOptions) -> StorageResult<Vec<Blob>> {
        let folder = path::normalize(folder_path);
        if !self.folder_exists(&folder) && !self.files.contains_key(&folder) {
            return Err(StorageError::NotFound(folder));
        }

        let child_prefix = if path::is_root(&folder) {
            "/".to_string()
        } else {
            format!("{folder}/")
        };

        let mut folders = BTreeSet::new();
        let mut files = BTreeMap::new();

        for entry in self.files.iter() {
            let Some(rest) = entry.key().strip_prefix(&child_prefix) else {
                continue;
            };
            match rest.split_once(path::SEPARATOR) {
                // Deeper descendant: only its first segment is visible here.
                Some((first, _)) => {
                    folders.insert(path::combine([folder.as_str(), first]));
                }
                None => {
                    // Server-side prefix filter, files only.
                    if let Some(prefix) = &options.file_prefix {
                        if !rest.starts_with(prefix.as_str()) {
                            continue;
                        }
                    }
                    files.insert(
                        entry.key().clone(),
                        entry.value().to_blob(entry.key(), options.include_attributes),
                    );
                }
            }
        }

        let mut result: Vec<Blob> = folders.into_iter().map(Blob::folder).collect();
        result.extend(files.into_values());
        Ok(result)
    }

    async fn exists(&self, full_path: &str) -> StorageResult<bool> {
        let full_path = path::normalize(full_path);
        Ok(self.files.contains_key(&full_path) || self.folder_exists(&full_path))
    }

    async fn open_read(&self, full_path: &str) -> StorageResult<Bytes> {
        let full_path = path::normalize(full_path);
        match self.files.get(&full_path) {
            Some(entry) => Ok(Bytes::copy_from_slice(&entry.data)),
            None => Err(StorageError::NotFound(full_path)),
        }
    }

    async fn write(&self, full_path: &str, data: Bytes, append: bool) -> StorageResult<()> {
        let full_path = path::normalize(full_path);
        if path::is_root(&full_path) {
            return Err(StorageError::Backend("cannot write to the root path".to_string()));
        }

        let now = Utc::now();
        let mut entry = self.files.entry(full_path).or_insert_with(|| StoredFile {
            data: Vec::new(),
            created_at: now,
            modified_at: now,
            metadata: BTreeMap::new(),
        });

        if append {
            entry.data.extend_from_slice(&data);
        } else {
            entry.data = data.to_vec();
        }
        entry.modified_at = now;
        Ok(())
    }

    async fn delete(&self, full_path: &str) -> StorageResult<()> {
        let full_path = path::normalize(full_path);
        self.files.remove(&full_path);

        // Folder delete removes the whole subtree.
        let prefix = format!("{full_path}/");
        self.files.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    async fn attributes(&self, full_path: &str) -> StorageResult<Blob> {
        let full_path = path::normalize(full_path);
        if let Some(entry) = self.files.get(&full_path) {
            return Ok(entry.to_blob(&full_path, true));
        }
        if self.folder_exists(&full_path) {
            return Ok(Blob::folder(full_path));
        }
        Err(StorageError::NotFound(full_path))
    }
}
