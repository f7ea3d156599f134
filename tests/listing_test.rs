//! Integration tests for the recursive listing engine across backends
//! with and without native hierarchy support.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use polystore::blob::{
    self, Blob, BlobKind, BlobStorage, InMemoryBlobStorage, ListOptions, LocalDiskStorage,
    StorageError, StorageResult,
};

use common::seed_files;

#[tokio::test]
async fn local_recursion_merges_subtrees() {
    common::init_tracing();
    let storage = InMemoryBlobStorage::new();
    seed_files(&storage, &["/a/b/file1", "/a/c/file2"]).await;

    let entries = blob::list(&storage, &ListOptions::recursive("/a")).await.unwrap();

    let paths: HashSet<&str> = entries.iter().map(|b| b.path.as_str()).collect();
    assert_eq!(entries.len(), 4, "expected b, c, file1, file2");
    assert_eq!(paths.len(), 4, "no duplicates");
    assert!(paths.contains("/a/b"));
    assert!(paths.contains("/a/c"));
    assert!(paths.contains("/a/b/file1"));
    assert!(paths.contains("/a/c/file2"));

    let folders = entries.iter().filter(|b| b.kind == BlobKind::Folder).count();
    assert_eq!(folders, 2);
}

#[tokio::test]
async fn hierarchy_capable_backend_returns_identical_tree() {
    common::init_tracing();
    let tree = [
        "/data/2024/jan/a.csv",
        "/data/2024/feb/b.csv",
        "/data/2025/jan/c.csv",
        "/data/readme.txt",
    ];

    let flat = InMemoryBlobStorage::new();
    seed_files(&flat, &tree).await;
    assert!(!flat.can_list_hierarchy());

    let tmp = tempfile::tempdir().unwrap();
    let native = LocalDiskStorage::new(tmp.path());
    seed_files(&native, &tree).await;
    assert!(native.can_list_hierarchy());

    let options = ListOptions::recursive("/data");
    let mut from_flat: Vec<String> = blob::list(&flat, &options)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.path)
        .collect();
    let mut from_native: Vec<String> = blob::list(&native, &options)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.path)
        .collect();

    from_flat.sort();
    from_native.sort();
    assert_eq!(from_flat, from_native);
    assert_eq!(from_flat.len(), 9, "4 files + 5 folders, each exactly once");
}

#[tokio::test]
async fn max_results_caps_at_every_value() {
    let storage = InMemoryBlobStorage::new();
    let paths: Vec<String> = (0..10)
        .flat_map(|d| (0..5).map(move |f| format!("/root/d{d}/f{f}")))
        .collect();
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    seed_files(&storage, &refs).await;

    let total = blob::list(&storage, &ListOptions::recursive("/root"))
        .await
        .unwrap()
        .len();
    assert_eq!(total, 60, "50 files + 10 folders");

    for cap in [1, 7, 10, 59, 60, 100] {
        let options = ListOptions {
            max_results: Some(cap),
            ..ListOptions::recursive("/root")
        };
        let entries = blob::list(&storage, &options).await.unwrap();
        assert_eq!(entries.len(), cap.min(60), "cap {cap}");
    }
}

#[tokio::test]
async fn missing_root_lists_empty() {
    let storage = InMemoryBlobStorage::new();
    seed_files(&storage, &["/elsewhere/file"]).await;

    let entries = blob::list(&storage, &ListOptions::recursive("/absent")).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn file_prefix_applies_in_every_folder() {
    let storage = InMemoryBlobStorage::new();
    seed_files(
        &storage,
        &[
            "/logs/app-1.log",
            "/logs/sys-1.log",
            "/logs/old/app-2.log",
            "/logs/old/sys-2.log",
        ],
    )
    .await;

    let options = ListOptions {
        file_prefix: Some("app-".to_string()),
        ..ListOptions::recursive("/logs")
    };
    let entries = blob::list(&storage, &options).await.unwrap();

    let files: Vec<&str> = entries
        .iter()
        .filter(|b| b.kind == BlobKind::File)
        .map(|b| b.path.as_str())
        .collect();
    assert_eq!(files, vec!["/logs/app-1.log", "/logs/old/app-2.log"]);
    // The folder itself is not prefix-filtered.
    assert!(entries.iter().any(|b| b.path == "/logs/old"));
}

#[tokio::test]
async fn browse_filter_prunes_candidates() {
    let storage = InMemoryBlobStorage::new();
    seed_files(&storage, &["/x/keep.txt", "/x/drop.txt", "/x/sub/keep2.txt"]).await;

    let options = ListOptions {
        browse_filter: Some(Arc::new(|b: &Blob| !b.name().starts_with("drop"))),
        ..ListOptions::recursive("/x")
    };
    let entries = blob::list(&storage, &options).await.unwrap();

    assert!(entries.iter().all(|b| !b.path.contains("drop")));
    assert!(entries.iter().any(|b| b.path == "/x/sub/keep2.txt"));
}

/// Storage whose subfolder listing fails with a non-absorbable error.
struct FaultySubtreeStorage {
    inner: InMemoryBlobStorage,
}

#[async_trait]
impl BlobStorage for FaultySubtreeStorage {
    async fn list_at(&self, folder_path: &str, options: &ListOptions) -> StorageResult<Vec<Blob>> {
        if folder_path == "/top/bad" {
            return Err(StorageError::Backend("subtree unavailable".to_string()));
        }
        self.inner.list_at(folder_path, options).await
    }

    async fn exists(&self, full_path: &str) -> StorageResult<bool> {
        self.inner.exists(full_path).await
    }

    async fn open_read(&self, full_path: &str) -> StorageResult<Bytes> {
        self.inner.open_read(full_path).await
    }

    async fn write(&self, full_path: &str, data: Bytes, append: bool) -> StorageResult<()> {
        self.inner.write(full_path, data, append).await
    }

    async fn delete(&self, full_path: &str) -> StorageResult<()> {
        self.inner.delete(full_path).await
    }
}

#[tokio::test]
async fn backend_fault_propagates_to_caller() {
    let storage = FaultySubtreeStorage { inner: InMemoryBlobStorage::new() };
    seed_files(&storage, &["/top/good/file", "/top/bad/file"]).await;

    let err = blob::list(&storage, &ListOptions::recursive("/top")).await.unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
}
