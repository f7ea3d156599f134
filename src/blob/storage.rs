//! Blob storage capability contract.
//!
//! Backends implement only the narrow primitive surface here; everything
//! else (full-tree traversal, filtering, capping) is derived by the generic
//! engine in [`super::list`]. See the module docs on `blob` for the
//! capability model.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;

use super::entry::Blob;
use super::error::{StorageError, StorageResult};
use super::list::ListOptions;

/// Minimal primitive surface of a hierarchical blob store.
///
/// Implementations must be safe to share across tasks; all methods take
/// `&self` and backends are expected to manage their own interior state.
///
/// Paths passed to these methods are always normalized (see [`crate::path`]).
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// True when one `list_at` call can return a whole subtree natively.
    ///
    /// When this returns true and the caller requested recursion, the
    /// listing engine issues a single call and performs no local descent.
    fn can_list_hierarchy(&self) -> bool {
        false
    }

    /// List the entries directly under `folder_path`.
    ///
    /// When [`Self::can_list_hierarchy`] is true and `options.recurse` is
    /// set, returns the entire subtree instead. Backends that can filter
    /// by `options.file_prefix` server-side should do so; the engine
    /// re-applies the filter client-side either way.
    async fn list_at(&self, folder_path: &str, options: &ListOptions) -> StorageResult<Vec<Blob>>;

    /// Whether an object exists at the path.
    async fn exists(&self, full_path: &str) -> StorageResult<bool>;

    /// Read the full content of a file.
    async fn open_read(&self, full_path: &str) -> StorageResult<Bytes>;

    /// Write (or append to) a file, creating parent folders as needed.
    async fn write(&self, full_path: &str, data: Bytes, append: bool) -> StorageResult<()>;

    /// Delete a file, or a folder together with everything under it.
    /// Deleting a missing path is not an error.
    async fn delete(&self, full_path: &str) -> StorageResult<()>;

    /// Fetch the attributes of a single object.
    async fn attributes(&self, full_path: &str) -> StorageResult<Blob> {
        let _ = full_path;
        Err(StorageError::Unsupported("attributes"))
    }

    /// Check existence of several paths concurrently.
    async fn exists_many(&self, full_paths: &[String]) -> StorageResult<Vec<bool>> {
        try_join_all(full_paths.iter().map(|p| self.exists(p))).await
    }

    /// Delete several paths concurrently.
    async fn delete_many(&self, full_paths: &[String]) -> StorageResult<()> {
        try_join_all(full_paths.iter().map(|p| self.delete(p))).await?;
        Ok(())
    }
}
