//! Chat read handlers.
//!
//! Endpoints:
//! - GET /api/v1/chats/{user_id} - List chats the user participates in

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use parley_types::chat::Chat;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/chats/{user_id} - List chats by participant.
///
/// An unknown user yields an empty list, not a 404.
pub async fn list_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Chat>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let chats = state.query_service.list_chats(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(chats, request_id, elapsed)))
}
