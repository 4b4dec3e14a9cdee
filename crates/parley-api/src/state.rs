//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI
//! and the HTTP/WebSocket layer. Services are generic over repository
//! traits, but AppState pins them to the concrete SQLite
//! implementations.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::chat::ChatService;
use parley_core::delivery::{ConnectionRegistry, Fanout};
use parley_core::query::QueryService;
use parley_infra::config::load_global_config;
use parley_infra::data_dir::resolve_data_dir;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::lead::SqliteUserRepository;
use parley_infra::sqlite::message::SqliteMessageRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::config::GlobalConfig;

/// Concrete type aliases for the service generics pinned to the SQLite
/// implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteMessageRepository>;

pub type ConcreteQueryService =
    QueryService<SqliteChatRepository, SqliteMessageRepository, SqliteUserRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub query_service: Arc<ConcreteQueryService>,
    pub registry: Arc<ConnectionRegistry>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join(&config.database.filename).display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        // One live-session registry for the process; the fan-out and
        // the WebSocket handlers share it.
        let registry = Arc::new(ConnectionRegistry::new());
        let fanout = Fanout::new(registry.clone());

        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            fanout,
        );

        let query_service = QueryService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
        );

        Ok(Self {
            chat_service: Arc::new(chat_service),
            query_service: Arc::new(query_service),
            registry,
            config,
            data_dir,
            db_pool,
        })
    }
}
