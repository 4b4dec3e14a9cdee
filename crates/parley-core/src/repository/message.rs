//! MessageRepository trait definition.

use parley_types::chat::Message;
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for message persistence.
///
/// Messages are immutable after insert; there are no update or delete
/// operations. All list operations return messages in created_at ASC
/// order. An unknown chat or sender yields an empty vec, not an error.
pub trait MessageRepository: Send + Sync {
    /// Insert a new message.
    fn insert_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List messages belonging to a chat, oldest first.
    fn list_messages(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// List every stored message, oldest first.
    fn list_all_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// List messages sent by the given identity, oldest first.
    fn list_messages_by_sender(
        &self,
        sender: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Count messages across all chats.
    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
