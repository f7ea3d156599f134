//! Queue message envelope.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

// ============================================================================
// Reserved Properties
// ============================================================================

/// Property carrying the storage path of externalized message content.
///
/// Set by [`super::LargeMessageMessenger`] when a payload is offloaded to
/// blob storage; the in-band content is cleared at the same time. Receivers
/// resolve the property back into a payload themselves.
pub const LARGE_CONTENT_PATH_PROPERTY: &str = "x-large-content-path";

// ============================================================================
// Queue Message
// ============================================================================

/// A message envelope: opaque payload, unique id, ordered string
/// properties, and pull-model delivery bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Unique message id, generated when not supplied.
    pub id: String,
    /// Opaque payload bytes.
    #[serde(with = "content_serde")]
    pub content: Bytes,
    /// Protocol metadata, ordered by key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// When the message becomes visible to receivers again. Set by
    /// pull-model backends on receive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_visible_at: Option<DateTime<Utc>>,
    /// How many times the message has been delivered.
    #[serde(default)]
    pub dequeue_count: u32,
}

impl QueueMessage {
    /// Create a message with a fresh ULID id.
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self::with_id(Ulid::new().to_string(), content)
    }

    /// Create a message with an explicit id.
    pub fn with_id(id: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            properties: BTreeMap::new(),
            next_visible_at: None,
            dequeue_count: 0,
        }
    }

    /// Create a message from UTF-8 text.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self::new(Bytes::copy_from_slice(text.as_ref().as_bytes()))
    }

    /// Set a property, replacing any previous value.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a property value.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Storage path of externalized content, when the payload was offloaded.
    pub fn large_content_path(&self) -> Option<&str> {
        self.property(LARGE_CONTENT_PATH_PROPERTY)
    }
}

mod content_serde {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(content: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(content)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let data = Vec::<u8>::deserialize(deserializer)?;
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_messages_get_unique_ids() {
        let a = QueueMessage::text("one");
        let b = QueueMessage::text("two");
        assert_ne!(a.id, b.id);
        assert_eq!(a.dequeue_count, 0);
        assert!(a.next_visible_at.is_none());
    }

    #[test]
    fn properties_are_ordered_by_key() {
        let msg = QueueMessage::text("x")
            .with_property("zeta", "1")
            .with_property("alpha", "2");

        let keys: Vec<&String> = msg.properties.keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
        assert_eq!(msg.property("alpha"), Some("2"));
        assert_eq!(msg.large_content_path(), None);
    }
}
