//! User read handlers.
//!
//! Endpoints:
//! - GET /api/v1/users - List all registered users

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use parley_types::lead::User;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/users - List all users.
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let users = state.query_service.list_users().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(users, request_id, elapsed)))
}
