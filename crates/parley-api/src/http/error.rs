//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};
use parley_core::query::LeadCreateError;
use parley_types::error::{IngestError, RepositoryError};
use uuid::Uuid;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed request input (bad UUID, empty body, ...).
    Validation(String),
    /// Single-record lookup found nothing.
    NotFound(String),
    /// A write raced another and lost.
    Conflict(String),
    /// Persistence unavailable or rejected an operation.
    Storage(String),
    /// Generic internal error.
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound("entity not found".to_string()),
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Validation(msg) => AppError::Validation(msg),
            IngestError::Storage(err) => err.into(),
        }
    }
}

impl From<LeadCreateError> for AppError {
    fn from(e: LeadCreateError) -> Self {
        match e {
            LeadCreateError::Empty => {
                AppError::Validation("invalid or empty leads data".to_string())
            }
            LeadCreateError::Validation(msg) => AppError::Validation(msg),
            LeadCreateError::Storage(err) => err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg),
            AppError::NotFound(msg) => ("NOT_FOUND", msg),
            AppError::Conflict(msg) => ("CONFLICT", msg),
            AppError::Storage(msg) => ("STORAGE_ERROR", msg),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg),
        };

        // The envelope's IntoResponse derives the status from the code.
        ApiResponse::<()>::error(code, &message, Uuid::now_v7().to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn repository_not_found_maps_to_404() {
        let err: AppError = RepositoryError::NotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_response_uses_the_envelope() {
        let resp = AppError::Validation("bad input".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ingest_validation_maps_to_validation() {
        let err: AppError = IngestError::Validation("empty".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_lead_batch_maps_to_validation() {
        let err: AppError = LeadCreateError::Empty.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
