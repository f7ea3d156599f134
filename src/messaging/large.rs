//! Message size externalization decorator.
//!
//! Wraps any [`Messenger`] so that payloads above a size threshold are
//! offloaded to blob storage before sending. The inner backend only ever
//! sees small envelopes carrying the reserved
//! [`LARGE_CONTENT_PATH_PROPERTY`](super::LARGE_CONTENT_PATH_PROPERTY)
//! pointing at the offloaded content.
//!
//! This decorator is send-path only: receive-side rehydration is an
//! extension point, and callers currently resolve the reserved property
//! back into a payload themselves (see
//! [`QueueMessage::large_content_path`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use ulid::Ulid;

use crate::blob::BlobStorage;
use crate::path;

use super::error::{MessagingError, MessagingResult};
use super::message::{QueueMessage, LARGE_CONTENT_PATH_PROPERTY};
use super::messenger::Messenger;

// ============================================================================
// Path Generation
// ============================================================================

/// Logical prefix under which offloaded payloads are stored by default.
pub const DEFAULT_OFFLOAD_FOLDER: &str = "message";

/// Strategy producing a unique storage path for an offloaded payload.
pub type BlobPathGenerator = Arc<dyn Fn(&QueueMessage) -> String + Send + Sync>;

fn default_blob_path(_message: &QueueMessage) -> String {
    path::combine([DEFAULT_OFFLOAD_FOLDER, Ulid::new().to_string().as_str()])
}

// ============================================================================
// Large Message Messenger
// ============================================================================

/// Messenger decorator that externalizes oversized payloads.
pub struct LargeMessageMessenger {
    inner: Arc<dyn Messenger>,
    offload_storage: Arc<dyn BlobStorage>,
    threshold: usize,
    path_generator: BlobPathGenerator,
    keep_inner_open: bool,
}

impl LargeMessageMessenger {
    /// Wrap `inner`, offloading payloads larger than `threshold` bytes to
    /// `offload_storage`.
    pub fn new(
        inner: Arc<dyn Messenger>,
        offload_storage: Arc<dyn BlobStorage>,
        threshold: usize,
    ) -> Self {
        Self {
            inner,
            offload_storage,
            threshold,
            path_generator: Arc::new(default_blob_path),
            keep_inner_open: false,
        }
    }

    /// Override the storage path generator for offloaded payloads.
    #[must_use]
    pub fn with_path_generator(mut self, generator: BlobPathGenerator) -> Self {
        self.path_generator = generator;
        self
    }

    /// Leave the inner messenger open when this decorator is closed.
    /// Use when the inner backend is shared with other owners.
    #[must_use]
    pub fn keep_inner_open(mut self, keep: bool) -> Self {
        self.keep_inner_open = keep;
        self
    }

    async fn externalize(&self, mut message: QueueMessage) -> MessagingResult<QueueMessage> {
        if message.content.len() <= self.threshold {
            return Ok(message);
        }

        let blob_path = (self.path_generator)(&message);
        self.offload_storage
            .write(&blob_path, message.content.clone(), false)
            .await?;

        debug!(
            message_id = %message.id,
            blob_path = %blob_path,
            size = message.content.len(),
            "Externalized oversized payload"
        );

        message
            .properties
            .insert(LARGE_CONTENT_PATH_PROPERTY.to_string(), blob_path);
        message.content = Bytes::new();
        Ok(message)
    }
}

#[async_trait]
impl Messenger for LargeMessageMessenger {
    async fn create_channels(&self, channels: &[&str]) -> MessagingResult<()> {
        self.inner.create_channels(channels).await
    }

    async fn list_channels(&self) -> MessagingResult<Vec<String>> {
        self.inner.list_channels().await
    }

    async fn delete_channels(&self, channels: &[&str]) -> MessagingResult<()> {
        self.inner.delete_channels(channels).await
    }

    async fn message_count(&self, channel: &str) -> MessagingResult<u64> {
        self.inner.message_count(channel).await
    }

    async fn send(&self, channel: &str, messages: Vec<QueueMessage>) -> MessagingResult<()> {
        let mut forwarded = Vec::with_capacity(messages.len());
        for message in messages {
            forwarded.push(self.externalize(message).await?);
        }
        self.inner.send(channel, forwarded).await
    }

    async fn receive(
        &self,
        _channel: &str,
        _max_count: usize,
        _visibility: Option<Duration>,
    ) -> MessagingResult<Vec<QueueMessage>> {
        // Rehydration of offloaded content is not implemented; receive
        // from the inner messenger directly and resolve
        // `large_content_path()` manually.
        Err(MessagingError::Unsupported("receive through large-message decorator"))
    }

    async fn peek(&self, _channel: &str, _max_count: usize) -> MessagingResult<Vec<QueueMessage>> {
        Err(MessagingError::Unsupported("peek through large-message decorator"))
    }

    async fn delete_messages(
        &self,
        channel: &str,
        messages: &[QueueMessage],
    ) -> MessagingResult<()> {
        self.inner.delete_messages(channel, messages).await
    }

    async fn close(&self) -> MessagingResult<()> {
        if self.keep_inner_open {
            return Ok(());
        }
        self.inner.close().await
    }
}
