//! Generic recursive listing engine.
//!
//! Turns a backend's one-level listing primitive into full-tree traversal:
//! bounded concurrent fan-out per folder wave, client-side filtering, and
//! result capping. Backends that can return a whole subtree in one call
//! (`can_list_hierarchy`) short-circuit the local recursion entirely.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::path;

use super::entry::Blob;
use super::error::{StorageError, StorageResult};
use super::storage::BlobStorage;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default bound on simultaneous in-flight one-level listing calls.
pub const DEFAULT_RECURSION_THREADS: usize = 10;

/// Default page size hint passed to backends that paginate.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

// ============================================================================
// List Options
// ============================================================================

/// Client-side predicate applied to every candidate entry before it is
/// accumulated. Runs after any backend-side filtering, never instead of it.
pub type BrowseFilter = Arc<dyn Fn(&Blob) -> bool + Send + Sync>;

/// Options for one listing traversal.
///
/// Immutable once a traversal starts; clone to scope a sub-traversal
/// without mutating the caller's options.
#[derive(Clone)]
pub struct ListOptions {
    /// Folder to start browsing from. Defaults to the root.
    pub folder_path: String,
    /// Prefix to filter file names by. Folders are unaffected; when
    /// recursing, the prefix applies in every folder.
    pub file_prefix: Option<String>,
    /// Client-side entry predicate.
    pub browse_filter: Option<BrowseFilter>,
    /// Recursively descend into folders.
    pub recurse: bool,
    /// Upper bound on returned entries, files and folders both counted.
    pub max_results: Option<usize>,
    /// Per-page item count hint for paginating backends.
    pub page_size: Option<usize>,
    /// Bound on simultaneous one-level listing calls during local
    /// recursion. Does not bound recursion depth.
    pub recursion_threads: usize,
    /// Eagerly populate entry metadata where the backend supports it.
    pub include_attributes: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            folder_path: path::ROOT.to_string(),
            file_prefix: None,
            browse_filter: None,
            recurse: false,
            max_results: None,
            page_size: None,
            recursion_threads: DEFAULT_RECURSION_THREADS,
            include_attributes: false,
        }
    }
}

impl ListOptions {
    /// Recursive listing rooted at `folder_path`.
    pub fn recursive(folder_path: impl Into<String>) -> Self {
        Self {
            folder_path: folder_path.into(),
            recurse: true,
            ..Self::default()
        }
    }

    /// True when the entry passes the file-prefix filter. Folders always
    /// match: the prefix constrains file names only.
    pub fn matches_prefix(&self, blob: &Blob) -> bool {
        match &self.file_prefix {
            Some(prefix) => blob.is_folder() || blob.name().starts_with(prefix.as_str()),
            None => true,
        }
    }

    fn accepts(&self, blob: &Blob) -> bool {
        if !self.matches_prefix(blob) {
            return false;
        }
        match &self.browse_filter {
            Some(filter) => filter(blob),
            None => true,
        }
    }
}

impl std::fmt::Debug for ListOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOptions")
            .field("folder_path", &self.folder_path)
            .field("file_prefix", &self.file_prefix)
            .field("has_browse_filter", &self.browse_filter.is_some())
            .field("recurse", &self.recurse)
            .field("max_results", &self.max_results)
            .field("page_size", &self.page_size)
            .field("recursion_threads", &self.recursion_threads)
            .field("include_attributes", &self.include_attributes)
            .finish()
    }
}

// ============================================================================
// Listing Engine
// ============================================================================

/// List entries under `options.folder_path` against any [`BlobStorage`].
///
/// Traversal proceeds in folder waves: every discovered folder in the
/// current wave is listed concurrently (bounded by
/// `options.recursion_threads`), completed pages are merged into a single
/// accumulator, and the next wave is built from the folders just found.
/// The cap is checked after each merged page, never mid-page, so one
/// backend page is never split inconsistently.
///
/// A missing folder anywhere, the traversal root included, contributes an
/// empty subtree instead of an error. Any other backend failure aborts the
/// whole traversal.
pub async fn list(storage: &dyn BlobStorage, options: &ListOptions) -> StorageResult<Vec<Blob>> {
    let root = path::normalize(&options.folder_path);
    let local_recursion = options.recurse && !storage.can_list_hierarchy();
    let width = options.recursion_threads.max(1);

    let mut results: Vec<Blob> = Vec::new();
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let mut next_frontier = Vec::new();
        let wave = std::mem::take(&mut frontier);

        let mut pages = stream::iter(wave.into_iter().map(|folder| async move {
            match storage.list_at(&folder, options).await {
                Ok(page) => Ok(page),
                // Absent subtrees are not an error for traversal.
                Err(StorageError::NotFound(_)) => Ok(Vec::new()),
                Err(e) => Err(e),
            }
        }))
        .buffer_unordered(width);

        while let Some(page) = pages.next().await {
            let page = page?;

            for blob in page {
                if local_recursion && blob.is_folder() {
                    next_frontier.push(blob.path.clone());
                }
                if options.accepts(&blob) {
                    results.push(blob);
                }
            }

            if let Some(max) = options.max_results {
                if results.len() >= max {
                    results.truncate(max);
                    debug!(max, "Listing capped, stopping traversal");
                    return Ok(results);
                }
            }
        }

        if !local_recursion {
            break;
        }
        frontier = next_frontier;
    }

    Ok(results)
}
