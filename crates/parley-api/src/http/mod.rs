//! HTTP/WebSocket layer for Parley.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format
//! and CORS support, plus the `/ws` live-message endpoint.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
