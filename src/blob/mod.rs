//! Hierarchical blob storage abstraction.
//!
//! Backends implement the narrow [`BlobStorage`] primitive surface
//! (one-level listing, exists, read, write, delete) and declare whether
//! they can list a whole hierarchy natively. The generic engine in
//! [`list`] derives full-tree traversal, filtering, and capping on top,
//! so one traversal algorithm works against every backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 callers: list(), read, write            │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ generic engine
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              BlobStorage (capability trait)             │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │ implementations
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │      InMemoryBlobStorage, LocalDiskStorage, vendors     │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod disk;
mod entry;
pub mod error;
mod list;
mod memory;
mod storage;

pub use disk::LocalDiskStorage;
pub use entry::{Blob, BlobKind};
pub use error::{StorageError, StorageResult};
pub use list::{list, BrowseFilter, ListOptions, DEFAULT_PAGE_SIZE, DEFAULT_RECURSION_THREADS};
pub use memory::InMemoryBlobStorage;
pub use storage::BlobStorage;
