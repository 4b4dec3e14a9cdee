//! WebSocket wire events.
//!
//! Clients and server exchange JSON text frames tagged with a `type`
//! field. Unknown or malformed inbound frames are answered with an
//! [`ServerEvent::Error`] frame and otherwise ignored.

use serde::{Deserialize, Serialize};

use crate::chat::IncomingMessage;

/// Inbound event from a WebSocket client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Send a message to another identity.
    Send {
        content: String,
        sender: String,
        receiver: String,
        #[serde(default)]
        from: Option<String>,
    },
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

impl ClientEvent {
    /// Convert a `send` event into the ingest pipeline's input shape.
    /// Returns `None` for non-message events.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        match self {
            ClientEvent::Send {
                content,
                sender,
                receiver,
                from,
            } => Some(IncomingMessage {
                content,
                sender,
                receiver,
                from,
            }),
            ClientEvent::Ping => None,
        }
    }
}

/// Outbound event pushed to a WebSocket client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message from another live session.
    Deliver {
        content: String,
        sender: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        from: Option<String>,
    },
    /// Response to a client ping.
    Pong,
    /// A client frame was rejected (validation or storage failure).
    Error { message: String },
}
