use thiserror::Error;

/// Errors surfaced by the workflow engine and its services.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown status: '{0}'")]
    UnknownStatus(String),

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("concurrent modification suspected: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in monteo-core).
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

impl From<RepositoryError> for EngineError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => EngineError::NotFound("entity".to_string()),
            RepositoryError::Conflict(msg) => EngineError::Conflict(msg),
            other => EngineError::Storage(other.to_string()),
        }
    }
}
