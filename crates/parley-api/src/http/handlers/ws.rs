//! WebSocket handler for real-time message exchange.
//!
//! The `/ws` endpoint upgrades an HTTP connection to a WebSocket. Once
//! connected, the handler:
//!
//! - **Registers a live session** in the [`ConnectionRegistry`] and
//!   forwards every [`ServerEvent`] queued for it as a JSON text frame.
//! - **Receives client frames:** parses incoming text as
//!   [`ClientEvent`] and runs `send` events through the ingest
//!   pipeline. The first `send` also associates the sender identity
//!   with the session.
//!
//! A rejected frame (malformed JSON, validation failure, storage
//! failure) is answered with an `error` frame on the same socket and
//! never kills the connection. Disconnecting removes the session from
//! the registry; that removal is terminal -- a reconnecting client gets
//! a fresh session and re-fetches missed history over the REST routes.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{Sink, SinkExt, StreamExt};
use parley_types::event::{ClientEvent, ServerEvent};

use crate::state::AppState;

/// Upgrade an HTTP request to a WebSocket connection.
///
/// This is mounted at `/ws` in the router.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Core WebSocket connection handler.
///
/// Uses `tokio::select!` to multiplex between the session's outbound
/// event queue (fed by the fan-out) and incoming WebSocket frames from
/// the client. Keeping both halves in a single task enables
/// bidirectional traffic (e.g., answering `ping` with `pong`).
async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (session_id, mut event_rx) = state.registry.register();
    tracing::info!(session_id = %session_id, "client connected");

    loop {
        tokio::select! {
            // --- Branch 1: Forward queued events to the client ---
            event = event_rx.recv() => {
                match event {
                    Some(event) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    // Client disconnected
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("failed to serialize ServerEvent: {err}");
                            }
                        }
                    }
                    None => {
                        // Registry entry gone (server shutting down)
                        break;
                    }
                }
            }

            // --- Branch 2: Process frames from the client ---
            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        process_frame(&text, session_id, &state, &mut ws_sender).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.remove(&session_id);
    tracing::info!(session_id = %session_id, "client disconnected");
}

/// Parse and process a single frame from the WebSocket client.
async fn process_frame(
    text: &str,
    session_id: uuid::Uuid,
    state: &AppState,
    ws_sender: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(raw = %text, error = %err, "ignoring malformed WebSocket frame");
            send_event(
                ws_sender,
                &ServerEvent::Error {
                    message: format!("malformed frame: {err}"),
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::Ping => {
            send_event(ws_sender, &ServerEvent::Pong).await;
        }
        send => {
            let Some(incoming) = send.into_incoming() else {
                return;
            };
            state.registry.associate(&session_id, incoming.sender.trim());

            if let Err(err) = state.chat_service.ingest(incoming, Some(session_id)).await {
                tracing::warn!(session_id = %session_id, error = %err, "message rejected");
                send_event(
                    ws_sender,
                    &ServerEvent::Error {
                        message: err.to_string(),
                    },
                )
                .await;
            }
        }
    }
}

async fn send_event(
    ws_sender: &mut (impl Sink<Message, Error = axum::Error> + Unpin),
    event: &ServerEvent,
) {
    match serde_json::to_string(event) {
        Ok(json) => {
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                tracing::debug!("failed to send event (client disconnecting)");
            }
        }
        Err(err) => {
            tracing::warn!("failed to serialize ServerEvent: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use parley_core::chat::ChatService;
    use parley_core::delivery::{ConnectionRegistry, Fanout};
    use parley_core::query::QueryService;
    use parley_infra::sqlite::chat::SqliteChatRepository;
    use parley_infra::sqlite::lead::SqliteUserRepository;
    use parley_infra::sqlite::message::SqliteMessageRepository;
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_types::config::GlobalConfig;

    /// Sink that records every frame written to it instead of hitting
    /// a real socket.
    #[derive(Default)]
    struct FrameLog {
        frames: Vec<Message>,
    }

    impl FrameLog {
        fn events(&self) -> Vec<ServerEvent> {
            self.frames
                .iter()
                .map(|frame| match frame {
                    Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
                    other => panic!("unexpected frame: {other:?}"),
                })
                .collect()
        }
    }

    impl Sink<Message> for FrameLog {
        type Error = axum::Error;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
            self.get_mut().frames.push(item);
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db_pool = DatabasePool::new(&url).await.unwrap();

        let registry = Arc::new(ConnectionRegistry::new());
        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            Fanout::new(registry.clone()),
        );
        let query_service = QueryService::new(
            SqliteChatRepository::new(db_pool.clone()),
            SqliteMessageRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
        );

        let state = AppState {
            chat_service: Arc::new(chat_service),
            query_service: Arc::new(query_service),
            registry,
            config: GlobalConfig::default(),
            data_dir: dir.path().to_path_buf(),
            db_pool,
        };
        (state, dir)
    }

    #[tokio::test]
    async fn malformed_frame_gets_error_and_session_survives() {
        let (state, _dir) = test_state().await;
        let (session_id, _rx) = state.registry.register();
        let mut sink = FrameLog::default();

        process_frame("this is not json", session_id, &state, &mut sink).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ServerEvent::Error { .. }));
        assert_eq!(state.registry.len(), 1, "session must stay registered");
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let (state, _dir) = test_state().await;
        let (session_id, _rx) = state.registry.register();
        let mut sink = FrameLog::default();

        process_frame(r#"{"type":"ping"}"#, session_id, &state, &mut sink).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ServerEvent::Pong));
    }

    #[tokio::test]
    async fn rejected_send_gets_error_and_stores_nothing() {
        let (state, _dir) = test_state().await;
        let (session_id, _rx) = state.registry.register();
        let mut sink = FrameLog::default();

        process_frame(
            r#"{"type":"send","content":"   ","sender":"u1","receiver":"u2"}"#,
            session_id,
            &state,
            &mut sink,
        )
        .await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::Error { message } => assert!(message.contains("content")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(state.query_service.list_all_messages().await.unwrap().is_empty());
        assert_eq!(state.registry.len(), 1, "session must stay registered");
    }

    #[tokio::test]
    async fn valid_send_stores_associates_and_fans_out_to_peers() {
        let (state, _dir) = test_state().await;
        let (session_id, mut rx_origin) = state.registry.register();
        let (_peer, mut rx_peer) = state.registry.register();
        let mut sink = FrameLog::default();

        process_frame(
            r#"{"type":"send","content":"hello","sender":"u1","receiver":"u2","from":"admin"}"#,
            session_id,
            &state,
            &mut sink,
        )
        .await;

        // No error frame back to the sender, and no self-echo.
        assert!(sink.events().is_empty());
        assert!(rx_origin.try_recv().is_err());

        match rx_peer.try_recv() {
            Ok(ServerEvent::Deliver { content, sender, from }) => {
                assert_eq!(content, "hello");
                assert_eq!(sender, "u1");
                assert_eq!(from.as_deref(), Some("admin"));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert_eq!(state.registry.identity(&session_id).as_deref(), Some("u1"));
        assert_eq!(state.query_service.list_all_messages().await.unwrap().len(), 1);
    }
}
