use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the message ingest pipeline.
///
/// `Validation` is rejected before any persistence or broadcast side
/// effect; `Storage` means a repository call failed mid-pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid message: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_ingest_error_display() {
        let err = IngestError::Validation("content must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid message: content must not be empty");
    }

    #[test]
    fn test_ingest_error_from_repository_error() {
        let err: IngestError = RepositoryError::Connection.into();
        assert!(matches!(err, IngestError::Storage(RepositoryError::Connection)));
    }
}
