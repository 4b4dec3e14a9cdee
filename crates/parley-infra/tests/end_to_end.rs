//! End-to-end pipeline tests over real SQLite storage.
//!
//! Wires the core services to the SQLite repositories exactly as the
//! server does and drives a full message exchange through them.

use std::sync::Arc;

use parley_core::chat::ChatService;
use parley_core::delivery::{ConnectionRegistry, Fanout};
use parley_core::query::QueryService;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::lead::SqliteUserRepository;
use parley_infra::sqlite::message::SqliteMessageRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_types::chat::IncomingMessage;
use parley_types::error::IngestError;
use parley_types::event::ServerEvent;

struct Harness {
    chat_service: ChatService<SqliteChatRepository, SqliteMessageRepository>,
    query_service: QueryService<SqliteChatRepository, SqliteMessageRepository, SqliteUserRepository>,
    registry: Arc<ConnectionRegistry>,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = DatabasePool::new(&url).await.unwrap();

    let registry = Arc::new(ConnectionRegistry::new());
    Harness {
        chat_service: ChatService::new(
            SqliteChatRepository::new(pool.clone()),
            SqliteMessageRepository::new(pool.clone()),
            Fanout::new(registry.clone()),
        ),
        query_service: QueryService::new(
            SqliteChatRepository::new(pool.clone()),
            SqliteMessageRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
        ),
        registry,
        _dir: dir,
    }
}

fn send(content: &str, sender: &str, receiver: &str) -> IncomingMessage {
    IncomingMessage {
        content: content.to_string(),
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        from: Some("admin".to_string()),
    }
}

#[tokio::test]
async fn first_message_creates_chat_and_is_listed() {
    let h = harness().await;

    let message = h
        .chat_service
        .ingest(send("hello", "u1", "u2"), None)
        .await
        .unwrap();

    // Chat is listed for the sender with the new summary.
    let chats = h.query_service.list_chats("u1").await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].id, message.chat_id);
    assert_eq!(chats[0].latest_message, "hello");
    assert_eq!(chats[0].latest_from.as_deref(), Some("admin"));

    // Exactly one message with the expected fields.
    let messages = h.query_service.list_messages(&message.chat_id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, "u1");
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[0].origin.as_deref(), Some("admin"));
}

#[tokio::test]
async fn conversation_shares_one_chat_in_order() {
    let h = harness().await;

    let first = h
        .chat_service
        .ingest(send("hello", "u1", "u2"), None)
        .await
        .unwrap();
    let reply = h
        .chat_service
        .ingest(send("hi back", "u2", "u1"), None)
        .await
        .unwrap();
    assert_eq!(first.chat_id, reply.chat_id);

    let messages = h.query_service.list_messages(&first.chat_id).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "hello");
    assert_eq!(messages[1].content, "hi back");

    // Both participants see the same single chat.
    let u1_chats = h.query_service.list_chats("u1").await.unwrap();
    let u2_chats = h.query_service.list_chats("u2").await.unwrap();
    assert_eq!(u1_chats.len(), 1);
    assert_eq!(u2_chats.len(), 1);
    assert_eq!(u1_chats[0].id, u2_chats[0].id);
    assert_eq!(u2_chats[0].latest_message, "hi back");
}

#[tokio::test]
async fn ingest_delivers_to_other_live_sessions() {
    let h = harness().await;

    let (origin, mut rx_origin) = h.registry.register();
    let (_b, mut rx_b) = h.registry.register();
    let (_c, mut rx_c) = h.registry.register();

    h.chat_service
        .ingest(send("hello", "u1", "u2"), Some(origin))
        .await
        .unwrap();

    for rx in [&mut rx_b, &mut rx_c] {
        match rx.recv().await {
            Some(ServerEvent::Deliver { content, sender, from }) => {
                assert_eq!(content, "hello");
                assert_eq!(sender, "u1");
                assert_eq!(from.as_deref(), Some("admin"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(rx_origin.try_recv().is_err(), "no self-echo");
}

#[tokio::test]
async fn rejected_message_stores_nothing() {
    let h = harness().await;

    let err = h
        .chat_service
        .ingest(send("   ", "u1", "u2"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Validation(_)));

    assert!(h.query_service.list_chats("u1").await.unwrap().is_empty());
    assert!(h.query_service.list_all_messages().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_senders_share_one_chat() {
    let h = harness().await;
    let service = Arc::new(h.chat_service);

    let mut handles = Vec::new();
    for i in 0..12 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .ingest(send(&format!("m{i}"), "u1", "u2"), None)
                .await
                .unwrap()
                .chat_id
        }));
    }

    let mut chat_ids = Vec::new();
    for handle in handles {
        chat_ids.push(handle.await.unwrap());
    }
    chat_ids.sort();
    chat_ids.dedup();
    assert_eq!(chat_ids.len(), 1, "all messages must land in one chat");

    let messages = h.query_service.list_messages(&chat_ids[0]).await.unwrap();
    assert_eq!(messages.len(), 12);
}
