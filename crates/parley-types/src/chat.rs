//! Chat thread and message types for Parley.
//!
//! A [`Chat`] is the durable record of one conversation between two
//! identities. A [`Message`] is an immutable event belonging to exactly
//! one chat. [`ChatKey`] is the normalized unordered participant pair
//! used for chat resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized unordered pair of participant identities.
///
/// Construction sorts the two IDs lexicographically so that
/// `ChatKey::new("b", "a") == ChatKey::new("a", "b")`. The pair is the
/// lookup key for chat resolution and maps to the
/// `UNIQUE(participant_a, participant_b)` constraint in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatKey {
    pub participant_a: String,
    pub participant_b: String,
}

impl ChatKey {
    /// Build a normalized key from two identities in any order.
    pub fn new(first: &str, second: &str) -> Self {
        if first <= second {
            Self {
                participant_a: first.to_string(),
                participant_b: second.to_string(),
            }
        } else {
            Self {
                participant_a: second.to_string(),
                participant_b: first.to_string(),
            }
        }
    }
}

/// A durable conversation thread between two identities.
///
/// Created lazily on the first message exchanged between a pair;
/// summary fields (`latest_message`, `latest_from`, `updated_at`) are
/// rewritten on every subsequent message. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub participant_a: String,
    pub participant_b: String,
    /// Denormalized copy of the most recent message content.
    pub latest_message: String,
    /// Origin tag of the most recent message (client surface, not identity).
    pub latest_from: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Whether the given identity participates in this chat.
    pub fn has_participant(&self, id: &str) -> bool {
        self.participant_a == id || self.participant_b == id
    }

    /// The normalized pair key for this chat.
    pub fn key(&self) -> ChatKey {
        ChatKey::new(&self.participant_a, &self.participant_b)
    }
}

/// An immutable message event within a chat.
///
/// Messages are ordered by `created_at` within a chat; IDs are UUIDv7,
/// so they sort by creation time as a tiebreaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender: String,
    pub content: String,
    /// Origin tag: which client surface produced the message
    /// (e.g. "admin"). Metadata, never the sender's identity.
    pub origin: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An inbound message before validation and chat resolution.
///
/// This is the payload of the WebSocket `send` event; the ingest
/// pipeline turns it into a persisted [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub content: String,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub from: Option<String>,
}
