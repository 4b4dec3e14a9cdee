//! SQLite message repository implementation.
//!
//! Messages are append-only; every list query orders by created_at ASC
//! with the UUIDv7 id as a tiebreaker for rows created in the same
//! millisecond.

use parley_core::repository::MessageRepository;
use parley_types::chat::Message;
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::chat::{format_datetime, map_write_error, parse_datetime};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    chat_id: String,
    sender: String,
    content: String,
    origin: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            sender: row.try_get("sender")?,
            content: row.try_get("content")?,
            origin: row.try_get("origin")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let chat_id = Uuid::parse_str(&self.chat_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Message {
            id,
            chat_id,
            sender: self.sender,
            content: self.content,
            origin: self.origin,
            created_at,
        })
    }
}

fn collect_messages(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Message>, RepositoryError> {
    rows.iter()
        .map(|r| {
            MessageRow::from_row(r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_message()
        })
        .collect()
}

impl MessageRepository for SqliteMessageRepository {
    async fn insert_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, sender, content, origin, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(&message.sender)
        .bind(&message.content)
        .bind(&message.origin)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn list_messages(&self, chat_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC")
                .bind(chat_id.to_string())
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        collect_messages(rows)
    }

    async fn list_all_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM messages ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        collect_messages(rows)
    }

    async fn list_messages_by_sender(&self, sender: &str) -> Result<Vec<Message>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM messages WHERE sender = ? ORDER BY created_at ASC, id ASC")
                .bind(sender)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        collect_messages(rows)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(row.0 as u64)
    }
}
