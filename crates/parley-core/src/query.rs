//! Read-only query service over the repositories, plus lead creation.
//!
//! Every operation is a direct filtered read through the persistence
//! port: no mutation of chat state, no broadcast. Absence of data is an
//! empty vec, never an error; storage failures propagate as
//! `RepositoryError`.

use chrono::Utc;
use parley_types::chat::{Chat, Message};
use parley_types::error::RepositoryError;
use parley_types::lead::{Lead, LeadBatch, User};
use uuid::Uuid;

use crate::repository::{ChatRepository, MessageRepository, UserRepository};

/// Stateless read surface for users, chats, messages, and leads.
pub struct QueryService<C: ChatRepository, M: MessageRepository, U: UserRepository> {
    chat_repo: C,
    message_repo: M,
    user_repo: U,
}

/// Error from bulk lead creation.
#[derive(Debug, thiserror::Error)]
pub enum LeadCreateError {
    #[error("invalid or empty leads data")]
    Empty,

    #[error("invalid lead: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl<C: ChatRepository, M: MessageRepository, U: UserRepository> QueryService<C, M, U> {
    pub fn new(chat_repo: C, message_repo: M, user_repo: U) -> Self {
        Self {
            chat_repo,
            message_repo,
            user_repo,
        }
    }

    /// All registered users.
    pub async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.user_repo.list_users().await
    }

    /// Chats where the given identity is a participant, most recently
    /// updated first.
    pub async fn list_chats(&self, user_id: &str) -> Result<Vec<Chat>, RepositoryError> {
        self.chat_repo.list_chats_for(user_id).await
    }

    /// Messages in a chat, creation order. Unknown chat IDs yield an
    /// empty vec.
    pub async fn list_messages(&self, chat_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        self.message_repo.list_messages(chat_id).await
    }

    /// Every stored message, creation order.
    pub async fn list_all_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        self.message_repo.list_all_messages().await
    }

    /// Messages sent by one identity, creation order.
    pub async fn list_messages_by_sender(
        &self,
        sender_id: &str,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.message_repo.list_messages_by_sender(sender_id).await
    }

    /// All stored leads.
    pub async fn list_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        self.user_repo.list_leads().await
    }

    /// Total chat count (status reporting).
    pub async fn count_chats(&self) -> Result<u64, RepositoryError> {
        self.chat_repo.count_chats().await
    }

    /// Total message count (status reporting).
    pub async fn count_messages(&self) -> Result<u64, RepositoryError> {
        self.message_repo.count_messages().await
    }

    /// Bulk-create lead records from a single object or an array.
    ///
    /// Both input shapes produce the same stored rows; empty input is
    /// rejected before touching storage. IDs and timestamps are
    /// assigned here so callers never supply them.
    pub async fn create_leads(&self, batch: LeadBatch) -> Result<Vec<Lead>, LeadCreateError> {
        let new_leads = batch.into_vec();
        if new_leads.is_empty() {
            return Err(LeadCreateError::Empty);
        }

        let now = Utc::now();
        let mut leads = Vec::with_capacity(new_leads.len());
        for new in new_leads {
            let full_name = new.full_name.trim();
            if full_name.is_empty() {
                return Err(LeadCreateError::Validation(
                    "full_name must not be empty".to_string(),
                ));
            }
            leads.push(Lead {
                id: Uuid::now_v7(),
                full_name: full_name.to_string(),
                email: new.email,
                phone: new.phone,
                source: new.source,
                created_at: now,
            });
        }

        self.user_repo.insert_leads(&leads).await?;
        tracing::info!(count = leads.len(), "leads inserted");
        Ok(leads)
    }
}
