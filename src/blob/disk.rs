//! Local-disk blob storage backend.
//!
//! Maps storage paths onto a root directory on the local filesystem.
//! The filesystem can walk a whole subtree itself, so this backend
//! declares `can_list_hierarchy = true` and the listing engine issues a
//! single call for recursive traversals.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::path;

use super::entry::{Blob, BlobKind};
use super::error::{StorageError, StorageResult};
use super::list::ListOptions;
use super::storage::BlobStorage;

// ============================================================================
// Local Disk Storage
// ============================================================================

/// Blob storage rooted at a local directory.
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a storage path onto an OS path under the root.
    ///
    /// Normalization folds `..` segments first, so the result can never
    /// escape the root directory.
    fn os_path(&self, full_path: &str) -> PathBuf {
        let mut out = self.root.clone();
        for segment in path::split(full_path) {
            out.push(segment);
        }
        out
    }

    /// Map an OS path back to a storage path relative to the root.
    fn storage_path(&self, os_path: &Path) -> String {
        let rel = os_path.strip_prefix(&self.root).unwrap_or(os_path);
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        path::combine(parts.iter().map(String::as_str))
    }

    async fn entry_blob(
        &self,
        os_path: &Path,
        kind: BlobKind,
        include_attributes: bool,
    ) -> StorageResult<Blob> {
        let meta = fs::metadata(os_path).await?;
        let mut blob = match kind {
            BlobKind::File => Blob::file(self.storage_path(os_path)).with_size(meta.len()),
            BlobKind::Folder => Blob::folder(self.storage_path(os_path)),
        };
        blob.created_at = meta.created().ok().map(DateTime::<Utc>::from);
        blob.modified_at = meta.modified().ok().map(DateTime::<Utc>::from);
        if include_attributes {
            blob.metadata
                .insert("read_only".to_string(), meta.permissions().readonly().to_string());
        }
        Ok(blob)
    }
}

fn map_io(full_path: &str, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(full_path.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl BlobStorage for LocalDiskStorage {
    fn can_list_hierarchy(&self) -> bool {
        true
    }

    async fn list_at(&self, folder_path: &str, options: &ListOptions) -> StorageResult<Vec<Blob>> {
        let folder = path::normalize(folder_path);
        let start = self.os_path(&folder);
        if !fs::try_exists(&start).await? {
            return Err(StorageError::NotFound(folder));
        }

        let mut result = Vec::new();
        let mut pending = vec![start];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| map_io(&folder, e))?;

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let os_path = entry.path();

                if file_type.is_dir() {
                    result.push(
                        self.entry_blob(&os_path, BlobKind::Folder, options.include_attributes)
                            .await?,
                    );
                    if options.recurse {
                        pending.push(os_path);
                    }
                } else if file_type.is_file() {
                    if let Some(prefix) = &options.file_prefix {
                        if !entry.file_name().to_string_lossy().starts_with(prefix.as_str()) {
                            continue;
                        }
                    }
                    result.push(
                        self.entry_blob(&os_path, BlobKind::File, options.include_attributes)
                            .await?,
                    );
                }
            }
        }

        Ok(result)
    }

    async fn exists(&self, full_path: &str) -> StorageResult<bool> {
        Ok(fs::try_exists(self.os_path(full_path)).await?)
    }

    async fn open_read(&self, full_path: &str) -> StorageResult<Bytes> {
        let data = fs::read(self.os_path(full_path))
            .await
            .map_err(|e| map_io(full_path, e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, full_path: &str, data: Bytes, append: bool) -> StorageResult<()> {
        let os_path = self.os_path(full_path);
        if let Some(parent) = os_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if append {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&os_path)
                .await?;
            file.write_all(&data).await?;
            file.flush().await?;
        } else {
            fs::write(&os_path, &data).await?;
        }
        Ok(())
    }

    async fn delete(&self, full_path: &str) -> StorageResult<()> {
        let os_path = self.os_path(full_path);
        let result = match fs::metadata(&os_path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&os_path).await,
            Ok(_) => fs::remove_file(&os_path).await,
            // Deleting a missing path is a no-op.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        result.map_err(|e| map_io(full_path, e))
    }

    async fn attributes(&self, full_path: &str) -> StorageResult<Blob> {
        let os_path = self.os_path(full_path);
        let meta = fs::metadata(&os_path).await.map_err(|e| map_io(full_path, e))?;
        let kind = if meta.is_dir() { BlobKind::Folder } else { BlobKind::File };
        self.entry_blob(&os_path, kind, true).await
    }
}
