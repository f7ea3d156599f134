//! Channel backend capability contract.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{MessagingError, MessagingResult};
use super::message::QueueMessage;

/// Minimal primitive surface of a message channel backend.
///
/// One messenger manages a namespace of named channels. Delivery is
/// at-least-once: a received message stays hidden for its visibility
/// window and reappears unless deleted in time.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Create channels. Creating an existing channel is a no-op.
    async fn create_channels(&self, channels: &[&str]) -> MessagingResult<()>;

    /// List channel names.
    async fn list_channels(&self) -> MessagingResult<Vec<String>>;

    /// Delete channels together with their messages.
    async fn delete_channels(&self, channels: &[&str]) -> MessagingResult<()>;

    /// Number of messages in a channel, hidden ones included.
    async fn message_count(&self, channel: &str) -> MessagingResult<u64>;

    /// Send a batch of messages to a channel.
    async fn send(&self, channel: &str, messages: Vec<QueueMessage>) -> MessagingResult<()>;

    /// Receive up to `max_count` messages, hiding each for `visibility`
    /// (backend default when `None`). May return fewer, or none.
    async fn receive(
        &self,
        channel: &str,
        max_count: usize,
        visibility: Option<Duration>,
    ) -> MessagingResult<Vec<QueueMessage>>;

    /// Look at up to `max_count` messages without affecting visibility.
    async fn peek(&self, channel: &str, max_count: usize) -> MessagingResult<Vec<QueueMessage>>;

    /// Delete (acknowledge) received messages so they are never redelivered.
    async fn delete_messages(
        &self,
        channel: &str,
        messages: &[QueueMessage],
    ) -> MessagingResult<()> {
        let _ = (channel, messages);
        Err(MessagingError::Unsupported("delete_messages"))
    }

    /// Release backend resources. Safe to call more than once.
    async fn close(&self) -> MessagingResult<()> {
        Ok(())
    }
}
