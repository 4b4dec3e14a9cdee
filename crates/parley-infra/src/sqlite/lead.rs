//! SQLite user and lead repository implementation.

use parley_core::repository::UserRepository;
use parley_types::error::RepositoryError;
use parley_types::lead::{Lead, User};
use sqlx::Row;
use uuid::Uuid;

use super::chat::{format_datetime, map_write_error, parse_datetime};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(User {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
        full_name: row
            .try_get("full_name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn lead_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Lead, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Lead {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Query(format!("invalid lead id: {e}")))?,
        full_name: row
            .try_get("full_name")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        phone: row
            .try_get("phone")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        source: row
            .try_get("source")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl UserRepository for SqliteUserRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(user_from_row).collect()
    }

    async fn insert_leads(&self, leads: &[Lead]) -> Result<(), RepositoryError> {
        // One statement per lead on the single-connection writer pool;
        // the batch sizes here (form submissions) don't warrant a
        // multi-row VALUES build.
        for lead in leads {
            sqlx::query(
                r#"INSERT INTO leads (id, full_name, email, phone, source, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(lead.id.to_string())
            .bind(&lead.full_name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.source)
            .bind(format_datetime(&lead.created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(map_write_error)?;
        }

        Ok(())
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM leads ORDER BY created_at ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(lead_from_row).collect()
    }
}
