//! Lead handlers.
//!
//! Endpoints:
//! - GET  /api/v1/leads - List all stored leads
//! - POST /api/v1/leads - Bulk-create leads (single object or array)

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use parley_types::lead::{Lead, LeadBatch};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/leads - List all leads.
pub async fn list_leads(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let leads = state.query_service.list_leads().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(leads, request_id, elapsed)))
}

/// POST /api/v1/leads - Bulk-create leads.
///
/// Accepts either a single lead object or an array of them; both store
/// the same shape. Empty input is rejected with a 400 before touching
/// storage.
pub async fn create_leads(
    State(state): State<AppState>,
    Json(batch): Json<LeadBatch>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Lead>>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let leads = state.query_service.create_leads(batch).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(leads, request_id, elapsed)),
    ))
}
