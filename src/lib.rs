//! Provider-agnostic hierarchical blob storage and message channels.
//!
//! Physically different backends expose very different shapes: some list
//! whole subtrees natively while others only enumerate one level; some
//! push messages while others must be polled. This crate keeps the
//! backend surface down to a handful of primitives and derives the rest
//! with backend-independent engines:
//!
//! - [`blob::list`] — generic recursive listing over any
//!   [`blob::BlobStorage`], with bounded fan-out, filtering, and capping.
//! - [`messaging::MessagePump`] — a cancellable, backoff-driven receive
//!   loop over any pull-model [`messaging::Messenger`].
//! - [`messaging::LargeMessageMessenger`] — transparent externalization
//!   of oversized payloads into blob storage.
//!
//! Concrete vendor adapters live outside this crate; the in-memory and
//! local-disk backends here double as reference implementations and test
//! fixtures.

pub mod blob;
pub mod messaging;
pub mod path;

pub use blob::{Blob, BlobKind, BlobStorage, ListOptions, StorageError, StorageResult};
pub use messaging::{
    Messenger, MessagingError, MessagingResult, QueueMessage,
};
