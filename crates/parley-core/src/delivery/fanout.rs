//! Best-effort fan-out of newly ingested messages to live sessions.
//!
//! Fan-out happens after the message is durably stored, so live
//! delivery carries no durability obligation of its own: a session that
//! is not connected at broadcast time simply never sees the live event
//! and recovers state through the query endpoints on reconnect.

use std::sync::Arc;

use parley_types::chat::Message;
use parley_types::event::ServerEvent;
use uuid::Uuid;

use crate::delivery::registry::ConnectionRegistry;

/// Broadcasts events to all live sessions except the originator.
///
/// Cloning shares the underlying registry. Publishing with zero
/// subscribers is a no-op, never an error.
#[derive(Debug, Clone)]
pub struct Fanout {
    registry: Arc<ConnectionRegistry>,
}

impl Fanout {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Push `event` to every live session except `origin`.
    ///
    /// Returns the number of sessions the event was handed to. A send
    /// to a closing session (receiver already dropped) is skipped and
    /// logged at debug; its registry entry is removed by the socket
    /// task's own disconnect path.
    pub fn broadcast(&self, event: &ServerEvent, origin: Option<Uuid>) -> usize {
        let mut delivered = 0;
        self.registry.for_each_except(origin.as_ref(), |id, session| {
            if session.send(event.clone()) {
                delivered += 1;
            } else {
                tracing::debug!(session_id = %id, "skipping closed session during broadcast");
            }
        });
        delivered
    }

    /// Fan out a freshly persisted message as a `deliver` event.
    pub fn broadcast_message(&self, message: &Message, origin: Option<Uuid>) -> usize {
        let event = ServerEvent::Deliver {
            content: message.content.clone(),
            sender: message.sender.clone(),
            from: message.origin.clone(),
        };
        self.broadcast(&event, origin)
    }
}
