//! HTTP request handlers for the REST API and the WebSocket endpoint.

pub mod chat;
pub mod lead;
pub mod message;
pub mod user;
pub mod ws;
