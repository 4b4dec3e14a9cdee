//! Chat service orchestrating the message ingest pipeline.
//!
//! `ChatService` coordinates the chat resolver, the repositories, and
//! the delivery fan-out: validate the incoming message, resolve its
//! chat, persist the message, rewrite the chat summary, then hand the
//! stored message to fan-out for live delivery.
//!
//! Generic over `ChatRepository` and `MessageRepository` to maintain
//! clean architecture (parley-core never depends on parley-infra).

use chrono::Utc;
use parley_types::chat::{Chat, IncomingMessage, Message};
use parley_types::error::{IngestError, RepositoryError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat::resolver::ChatResolver;
use crate::delivery::Fanout;
use crate::repository::{ChatRepository, MessageRepository};

/// Orchestrates message ingest and chat lifecycle.
pub struct ChatService<C: ChatRepository, M: MessageRepository> {
    chat_repo: C,
    message_repo: M,
    resolver: ChatResolver,
    fanout: Fanout,
}

impl<C: ChatRepository, M: MessageRepository> ChatService<C, M> {
    /// Create a new chat service with the given repositories and fan-out.
    pub fn new(chat_repo: C, message_repo: M, fanout: Fanout) -> Self {
        Self {
            chat_repo,
            message_repo,
            resolver: ChatResolver::new(),
            fanout,
        }
    }

    /// Resolve the chat thread for a pair, creating it on first contact.
    pub async fn resolve_or_create_chat(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<Chat, RepositoryError> {
        self.resolver
            .resolve_or_create(&self.chat_repo, sender, receiver)
            .await
    }

    /// Run the full ingest pipeline for one incoming message.
    ///
    /// Steps, in order, each depending on the previous succeeding:
    ///
    /// 1. Validate: content, sender, receiver non-empty after trimming.
    ///    Rejected before any persistence or broadcast side effect.
    /// 2. Resolve the chat for the (sender, receiver) pair.
    /// 3. Insert the message row; failure aborts the pipeline.
    /// 4. Rewrite the chat summary. Failure here is logged and does NOT
    ///    fail the ingest: the message is already durable and no
    ///    cross-record transaction is available, so the summary is
    ///    allowed to go stale until the next message repairs it.
    /// 5. Fan out to live sessions except `origin_session`. Best-effort;
    ///    zero connected peers is success.
    pub async fn ingest(
        &self,
        incoming: IncomingMessage,
        origin_session: Option<Uuid>,
    ) -> Result<Message, IngestError> {
        let content = incoming.content.trim();
        let sender = incoming.sender.trim();
        let receiver = incoming.receiver.trim();

        if content.is_empty() {
            return Err(IngestError::Validation("content must not be empty".to_string()));
        }
        if sender.is_empty() {
            return Err(IngestError::Validation("sender must not be empty".to_string()));
        }
        if receiver.is_empty() {
            return Err(IngestError::Validation("receiver must not be empty".to_string()));
        }
        let origin = incoming
            .from
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let chat = self.resolve_or_create_chat(sender, receiver).await?;

        let message = Message {
            id: Uuid::now_v7(),
            chat_id: chat.id,
            sender: sender.to_string(),
            content: content.to_string(),
            origin,
            created_at: Utc::now(),
        };
        self.message_repo.insert_message(&message).await?;

        if let Err(err) = self
            .chat_repo
            .update_chat_summary(
                &chat.id,
                &message.content,
                message.origin.as_deref(),
                message.created_at,
            )
            .await
        {
            // The message is already durable; the stale summary is
            // repaired by the next successful ingest for this chat.
            warn!(
                chat_id = %chat.id,
                message_id = %message.id,
                error = %err,
                "chat summary update failed after message insert; summary is stale"
            );
        }

        let delivered = self.fanout.broadcast_message(&message, origin_session);
        debug!(
            message_id = %message.id,
            chat_id = %chat.id,
            delivered,
            "message ingested"
        );

        Ok(message)
    }
}
