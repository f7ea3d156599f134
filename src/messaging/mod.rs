//! Asynchronous message channel abstraction.
//!
//! Backends implement the narrow [`Messenger`] primitive surface
//! (send-batch, receive-batch, channel management). On top of it:
//!
//! - [`MessagePump`] turns one-batch receive into a continuous,
//!   cancellable delivery loop with adaptive backoff, for backends
//!   without native push delivery.
//! - [`LargeMessageMessenger`] offloads oversized payloads into blob
//!   storage so any downstream backend only sees small envelopes.
//! - [`InMemoryMessenger`] provides pull-model queue semantics in
//!   process memory, with a caller-owned [`MemoryMessengerRegistry`]
//!   instead of process-wide state.

pub mod error;
mod large;
mod memory;
mod message;
mod messenger;
mod polling;
mod pump;

pub use error::{MessagingError, MessagingResult};
pub use large::{BlobPathGenerator, LargeMessageMessenger, DEFAULT_OFFLOAD_FOLDER};
pub use memory::{InMemoryMessenger, MemoryMessengerRegistry, DEFAULT_VISIBILITY};
pub use message::{QueueMessage, LARGE_CONTENT_PATH_PROPERTY};
pub use messenger::Messenger;
pub use polling::{
    ExponentialBackoffPolicy, PollingPolicy, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY,
};
pub use pump::{MessageHandler, MessagePump, PumpConfig, PumpHandle, DEFAULT_BATCH_SIZE};
