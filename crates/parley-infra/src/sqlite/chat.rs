//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, reads on the
//! reader pool and writes on the writer pool. The schema's
//! `UNIQUE(participant_a, participant_b)` constraint is surfaced as
//! `RepositoryError::Conflict` so the resolver can re-read the winner.

use chrono::{DateTime, Utc};
use parley_core::repository::ChatRepository;
use parley_types::chat::{Chat, ChatKey};
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: String,
    participant_a: String,
    participant_b: String,
    latest_message: String,
    latest_from: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            participant_a: row.try_get("participant_a")?,
            participant_b: row.try_get("participant_b")?,
            latest_message: row.try_get("latest_message")?,
            latest_from: row.try_get("latest_from")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Chat {
            id,
            participant_a: self.participant_a,
            participant_b: self.participant_b,
            latest_message: self.latest_message,
            latest_from: self.latest_from,
            created_at,
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub(crate) fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        _ => RepositoryError::Query(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chats (id, participant_a, participant_b, latest_message, latest_from, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(&chat.participant_a)
        .bind(&chat.participant_b)
        .bind(&chat.latest_message)
        .bind(&chat.latest_from)
        .bind(format_datetime(&chat.created_at))
        .bind(format_datetime(&chat.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn get_chat(&self, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| {
            ChatRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_chat()
        })
        .transpose()
    }

    async fn find_chat_by_pair(&self, key: &ChatKey) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE participant_a = ? AND participant_b = ?")
            .bind(&key.participant_a)
            .bind(&key.participant_b)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| {
            ChatRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_chat()
        })
        .transpose()
    }

    async fn update_chat_summary(
        &self,
        chat_id: &Uuid,
        latest_message: &str,
        latest_from: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chats SET latest_message = ?, latest_from = ?, updated_at = ? WHERE id = ?",
        )
        .bind(latest_message)
        .bind(latest_from)
        .bind(format_datetime(&updated_at))
        .bind(chat_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_chats_for(&self, participant: &str) -> Result<Vec<Chat>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chats WHERE participant_a = ? OR participant_b = ? ORDER BY updated_at DESC",
        )
        .bind(participant)
        .bind(participant)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|r| {
                ChatRow::from_row(r)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_chat()
            })
            .collect()
    }

    async fn count_chats(&self) -> Result<u64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(row.0 as u64)
    }
}
