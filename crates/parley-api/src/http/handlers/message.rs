//! Message read handlers.
//!
//! Endpoints:
//! - GET /api/v1/messages                 - All messages
//! - GET /api/v1/messages/{chat_id}       - Messages in a chat, creation order
//! - GET /api/v1/messages/by-sender       - Messages filtered by ?sender_id=

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use parley_types::chat::Message;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for the by-sender listing.
#[derive(Debug, Deserialize)]
pub struct SenderQuery {
    /// When omitted, all messages are returned.
    pub sender_id: Option<String>,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid UUID: {s}")))
}

/// GET /api/v1/messages - List every stored message.
pub async fn list_all_messages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Message>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let messages = state.query_service.list_all_messages().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, request_id, elapsed)))
}

/// GET /api/v1/messages/{chat_id} - List messages in a chat.
///
/// An unknown chat ID yields an empty list, not a 404.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Message>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chat_id = parse_uuid(&chat_id)?;
    let messages = state.query_service.list_messages(&chat_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, request_id, elapsed)))
}

/// GET /api/v1/messages/by-sender?sender_id=... - List messages by sender.
pub async fn list_messages_by_sender(
    State(state): State<AppState>,
    Query(query): Query<SenderQuery>,
) -> Result<Json<ApiResponse<Vec<Message>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let messages = match query.sender_id.as_deref() {
        Some(sender_id) => state.query_service.list_messages_by_sender(sender_id).await?,
        None => state.query_service.list_all_messages().await?,
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, request_id, elapsed)))
}
