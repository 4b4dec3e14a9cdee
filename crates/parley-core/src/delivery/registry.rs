//! Registry of live client sessions.
//!
//! One [`LiveSession`] per connected WebSocket client. Sessions are
//! ephemeral and never persisted: registered on connect, removed on
//! disconnect (terminal -- a reconnecting client gets a fresh session
//! ID and re-fetches missed history over the query endpoints).
//!
//! The registry is a service object created at startup and injected
//! into the fan-out, not ambient global state. The `DashMap` supports
//! the concurrent add/remove/iterate pattern the fan-out needs.

use dashmap::DashMap;
use parley_types::event::ServerEvent;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A live connected client session.
///
/// Holds the sending half of the session's outbound event channel and
/// an optional sender identity learned from the first identity-bearing
/// message. Identity association is an enrichment for logging, not a
/// requirement for fan-out (delivery is all-but-origin, not addressed).
#[derive(Debug)]
pub struct LiveSession {
    pub identity: Option<String>,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl LiveSession {
    /// Push an event to this session. Fails only if the receiving half
    /// (the socket task) has already gone away.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Tracks all live sessions for the lifetime of the process.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<Uuid, LiveSession>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a new session, returning its handle and the receiving
    /// end of its outbound event channel.
    ///
    /// The unbounded channel preserves per-subscriber FIFO order; the
    /// socket task drains it into the WebSocket sink.
    pub fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = Uuid::now_v7();
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.insert(id, LiveSession { identity: None, tx });
        tracing::debug!(session_id = %id, live = self.len(), "session registered");
        (id, rx)
    }

    /// Associate a sender identity with a session (first message wins).
    pub fn associate(&self, session_id: &Uuid, identity: &str) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            if session.identity.is_none() {
                session.identity = Some(identity.to_string());
                tracing::debug!(session_id = %session_id, identity, "session identity associated");
            }
        }
    }

    /// The identity associated with a session, if any.
    pub fn identity(&self, session_id: &Uuid) -> Option<String> {
        self.sessions
            .get(session_id)
            .and_then(|s| s.identity.clone())
    }

    /// Remove a session on disconnect. Removal is terminal.
    pub fn remove(&self, session_id: &Uuid) {
        self.sessions.remove(session_id);
        tracing::debug!(session_id = %session_id, live = self.len(), "session removed");
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Run `f` for every live session except `skip`.
    pub(crate) fn for_each_except(&self, skip: Option<&Uuid>, mut f: impl FnMut(&Uuid, &LiveSession)) {
        for entry in self.sessions.iter() {
            if Some(entry.key()) == skip {
                continue;
            }
            f(entry.key(), entry.value());
        }
    }
}
