//! In-memory channel backend and its registry.
//!
//! One [`InMemoryMessenger`] manages a namespace of FIFO channels with
//! pull-model visibility semantics: receiving hides a message for its
//! visibility window instead of removing it, and only
//! `delete_messages` removes it for good.
//!
//! [`MemoryMessengerRegistry`] replaces the process-wide name-to-instance
//! cache such backends usually hide behind: it is an explicitly
//! constructed, caller-owned object with create/lookup/dispose lifecycle.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use super::error::MessagingResult;
use super::message::QueueMessage;
use super::messenger::Messenger;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Visibility window applied when the receiver does not specify one.
pub const DEFAULT_VISIBILITY: Duration = Duration::from_secs(60);

// ============================================================================
// In-Memory Messenger
// ============================================================================

type Channel = Arc<Mutex<VecDeque<QueueMessage>>>;

/// Channel backend held entirely in process memory.
///
/// Sending to an unknown channel creates it, matching the lenient
/// semantics of typical queue emulators.
#[derive(Default)]
pub struct InMemoryMessenger {
    // std Mutex: the lock is never held across an await point.
    channels: DashMap<String, Channel>,
}

impl InMemoryMessenger {
    /// Create a messenger with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, name: &str) -> Channel {
        self.channels
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn take_visible(
        &self,
        channel: &str,
        max_count: usize,
        visibility: Option<Duration>,
        peek_only: bool,
    ) -> Vec<QueueMessage> {
        let queue = self.channel(channel);
        let mut queue = queue.lock().expect("queue mutex poisoned");

        let now = Utc::now();
        let hide_until = now
            + chrono::Duration::from_std(visibility.unwrap_or(DEFAULT_VISIBILITY))
                .unwrap_or_else(|_| chrono::Duration::seconds(60));

        let mut result = Vec::new();
        // One full rotation of the queue, at most.
        for _ in 0..queue.len() {
            if result.len() >= max_count {
                break;
            }
            let Some(mut message) = queue.pop_front() else {
                break;
            };

            let visible = message.next_visible_at.map_or(true, |t| t <= now);
            if visible {
                if !peek_only {
                    message.next_visible_at = Some(hide_until);
                    message.dequeue_count += 1;
                }
                result.push(message.clone());
            }
            queue.push_back(message);
        }
        result
    }
}

#[async_trait]
impl Messenger for InMemoryMessenger {
    async fn create_channels(&self, channels: &[&str]) -> MessagingResult<()> {
        for name in channels {
            self.channels.entry((*name).to_string()).or_default();
        }
        Ok(())
    }

    async fn list_channels(&self) -> MessagingResult<Vec<String>> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn delete_channels(&self, channels: &[&str]) -> MessagingResult<()> {
        for name in channels {
            self.channels.remove(*name);
        }
        Ok(())
    }

    async fn message_count(&self, channel: &str) -> MessagingResult<u64> {
        let count = self
            .channels
            .get(channel)
            .map(|q| q.lock().expect("queue mutex poisoned").len())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn send(&self, channel: &str, messages: Vec<QueueMessage>) -> MessagingResult<()> {
        let queue = self.channel(channel);
        let mut queue = queue.lock().expect("queue mutex poisoned");
        for message in messages {
            queue.push_back(message);
        }
        Ok(())
    }

    async fn receive(
        &self,
        channel: &str,
        max_count: usize,
        visibility: Option<Duration>,
    ) -> MessagingResult<Vec<QueueMessage>> {
        Ok(self.take_visible(channel, max_count, visibility, false))
    }

    async fn peek(&self, channel: &str, max_count: usize) -> MessagingResult<Vec<QueueMessage>> {
        Ok(self.take_visible(channel, max_count, None, true))
    }

    async fn delete_messages(
        &self,
        channel: &str,
        messages: &[QueueMessage],
    ) -> MessagingResult<()> {
        let ids: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        if let Some(queue) = self.channels.get(channel) {
            queue
                .lock()
                .expect("queue mutex poisoned")
                .retain(|m| !ids.contains(m.id.as_str()));
        }
        Ok(())
    }
}

// ============================================================================
// Messenger Registry
// ============================================================================

/// Caller-owned registry of named in-memory messengers.
///
/// Get-or-create is race free: two concurrent lookups of the same name
/// observe the same instance.
#[derive(Clone, Default)]
pub struct MemoryMessengerRegistry {
    messengers: Arc<DashMap<String, Arc<InMemoryMessenger>>>,
}

impl MemoryMessengerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a messenger by name, creating it on first use.
    pub fn create_or_get(&self, name: &str) -> Arc<InMemoryMessenger> {
        self.messengers
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(name, "Created in-memory messenger");
                Arc::new(InMemoryMessenger::new())
            })
            .clone()
    }

    /// Look up an existing messenger by name.
    pub fn get(&self, name: &str) -> Option<Arc<InMemoryMessenger>> {
        self.messengers.get(name).map(|e| e.value().clone())
    }

    /// Drop a messenger from the registry. Existing handles stay valid.
    pub fn dispose(&self, name: &str) -> bool {
        self.messengers.remove(name).is_some()
    }

    /// Number of registered messengers.
    pub fn len(&self) -> usize {
        self.messengers.len()
    }

    /// True when no messengers are registered.
    pub fn is_empty(&self) -> bool {
        self.messengers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_receive_hides_until_deleted() {
        let messenger = InMemoryMessenger::new();
        messenger
            .send("jobs", vec![QueueMessage::text("work")])
            .await
            .unwrap();

        let batch = messenger
            .receive("jobs", 10, Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].dequeue_count, 1);

        // Hidden inside the visibility window.
        let again = messenger.receive("jobs", 10, None).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(messenger.message_count("jobs").await.unwrap(), 1);

        messenger.delete_messages("jobs", &batch).await.unwrap();
        assert_eq!(messenger.message_count("jobs").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn peek_does_not_consume_or_hide() {
        let messenger = InMemoryMessenger::new();
        messenger
            .send("jobs", vec![QueueMessage::text("a"), QueueMessage::text("b")])
            .await
            .unwrap();

        let peeked = messenger.peek("jobs", 1).await.unwrap();
        assert_eq!(peeked.len(), 1);
        assert_eq!(peeked[0].dequeue_count, 0);

        let received = messenger.receive("jobs", 10, None).await.unwrap();
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn receive_respects_batch_limit_and_fifo_order() {
        let messenger = InMemoryMessenger::new();
        let sent: Vec<QueueMessage> = (0..5).map(|i| QueueMessage::text(format!("m{i}"))).collect();
        let ids: Vec<String> = sent.iter().map(|m| m.id.clone()).collect();
        messenger.send("jobs", sent).await.unwrap();

        let batch = messenger.receive("jobs", 3, None).await.unwrap();
        let got: Vec<String> = batch.iter().map(|m| m.id.clone()).collect();
        assert_eq!(got, ids[..3]);
    }

    #[tokio::test]
    async fn channel_management() {
        let messenger = InMemoryMessenger::new();
        messenger.create_channels(&["a", "b"]).await.unwrap();
        messenger.create_channels(&["a"]).await.unwrap(); // no-op
        assert_eq!(messenger.list_channels().await.unwrap(), vec!["a", "b"]);

        messenger.delete_channels(&["a"]).await.unwrap();
        assert_eq!(messenger.list_channels().await.unwrap(), vec!["b"]);
    }

    #[test]
    fn registry_get_or_create_returns_same_instance() {
        let registry = MemoryMessengerRegistry::new();
        let first = registry.create_or_get("shared");
        let second = registry.create_or_get("shared");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        assert!(registry.dispose("shared"));
        assert!(!registry.dispose("shared"));
        assert!(registry.get("shared").is_none());
    }
}
