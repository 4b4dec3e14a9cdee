//! SQLite connection pooling for the chat store.
//!
//! The chat workload is read-heavy: history fetches on reconnect and
//! the REST list endpoints, against a single serialized write path
//! (message ingest). `DatabasePool` splits the two sides, with WAL
//! journaling so readers never block the writer.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

/// Upper bound on concurrent read connections. The list endpoints are
/// the only consumers; eight covers them comfortably.
const MAX_READERS: u32 = 8;

/// How long a connection waits on a locked database before giving up.
/// Writes are funneled through one connection, so lock contention is
/// limited to WAL checkpoints.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Paired read and write pools over one SQLite database file.
///
/// `writer` holds exactly one connection and takes every
/// INSERT/UPDATE, which keeps SQLite's single-writer rule out of the
/// repository code. `reader` serves SELECTs concurrently and is opened
/// read-only.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database (creating the file if missing), run the
    /// embedded migrations, then open the read pool.
    ///
    /// Foreign keys are enforced on every connection; the messages
    /// table relies on that for its chat reference.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT)
            .create_if_missing(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts.clone())
            .await?;

        // Migrate through the writer before any reader exists, so a
        // reader never observes a half-migrated schema.
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(MAX_READERS)
            .connect_with(opts.read_only(true))
            .await?;

        Ok(Self { reader, writer })
    }
}
