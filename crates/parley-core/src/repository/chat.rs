//! ChatRepository trait definition.
//!
//! Chats are resolved by their normalized participant pair; the
//! implementation is expected to back `create_chat` with a uniqueness
//! constraint on that pair and surface violations as
//! `RepositoryError::Conflict` so the resolver can re-read the winner.

use chrono::{DateTime, Utc};
use parley_types::chat::{Chat, ChatKey};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat thread persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Insert a new chat thread.
    ///
    /// Returns `RepositoryError::Conflict` if a chat for the same
    /// normalized pair already exists.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a chat by its unique ID.
    fn get_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Look up the chat for a normalized participant pair.
    fn find_chat_by_pair(
        &self,
        key: &ChatKey,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Rewrite a chat's denormalized summary fields.
    fn update_chat_summary(
        &self,
        chat_id: &Uuid,
        latest_message: &str,
        latest_from: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List chats where the given identity is a participant,
    /// ordered by updated_at DESC.
    fn list_chats_for(
        &self,
        participant: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Count chats across all pairs.
    fn count_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
