//! Find-or-create resolution of the chat thread for an identity pair.
//!
//! The invariant: at most one chat exists for any unordered pair of
//! participants. Two defenses uphold it under concurrency:
//!
//! 1. A per-pair `tokio::Mutex` serializes the find-or-create critical
//!    section within this process.
//! 2. The storage layer's uniqueness constraint on the normalized pair;
//!    a `Conflict` from `create_chat` triggers a re-read of the winner.
//!
//! The second covers writers outside this process (or a lock entry
//! recycled mid-flight), so losing a race is never an error surfaced to
//! the caller.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parley_types::chat::{Chat, ChatKey};
use parley_types::error::RepositoryError;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::repository::ChatRepository;

/// Resolves a (sender, receiver) pair to its single chat thread,
/// creating the thread on first contact.
#[derive(Debug, Default)]
pub struct ChatResolver {
    locks: DashMap<ChatKey, Arc<Mutex<()>>>,
}

impl ChatResolver {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Return the chat for the pair, creating it if none exists.
    ///
    /// Idempotent: repeated and concurrent calls for the same pair
    /// converge on the same chat ID. Equal sender and receiver is
    /// treated as a degenerate single-party chat, not an error.
    pub async fn resolve_or_create<C: ChatRepository>(
        &self,
        repo: &C,
        sender: &str,
        receiver: &str,
    ) -> Result<Chat, RepositoryError> {
        let key = ChatKey::new(sender, receiver);

        // Fast path: the chat usually already exists.
        if let Some(chat) = repo.find_chat_by_pair(&key).await? {
            self.locks.remove(&key);
            return Ok(chat);
        }

        // Scope the map guard so it is not held across the await points.
        let lock = {
            let entry = self.locks.entry(key.clone()).or_default();
            entry.value().clone()
        };
        let _guard = lock.lock().await;

        // Re-check under the lock: a concurrent caller may have won.
        if let Some(chat) = repo.find_chat_by_pair(&key).await? {
            return Ok(chat);
        }

        let now = Utc::now();
        let chat = Chat {
            id: Uuid::now_v7(),
            participant_a: key.participant_a.clone(),
            participant_b: key.participant_b.clone(),
            latest_message: format!("{sender} initiated a chat"),
            latest_from: None,
            created_at: now,
            updated_at: now,
        };

        match repo.create_chat(&chat).await {
            Ok(()) => {
                tracing::info!(chat_id = %chat.id, sender, receiver, "chat created");
                Ok(chat)
            }
            Err(RepositoryError::Conflict(_)) => {
                // Lost the race to a writer outside our lock; the
                // winner's chat is the chat.
                repo.find_chat_by_pair(&key)
                    .await?
                    .ok_or_else(|| RepositoryError::Query("chat vanished after conflict".to_string()))
            }
            Err(err) => Err(err),
        }
    }
}
