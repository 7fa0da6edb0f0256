// Error taxonomy for the donation engine

use thiserror::Error;

use super::validation::ValidationResult;
use crate::services::blob::UploadError;

/// Typed failures surfaced by every store method.
///
/// Validation errors are recoverable locally (form feedback, nothing was
/// mutated). `Unauthenticated`/`SessionExpired` unwind to a global sign-out.
/// Everything else is surfaced to the caller as-is and never mutates the
/// cached entity state.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no active session")]
    Unauthenticated,

    #[error("session expired, sign in again")]
    SessionExpired,

    #[error("operation not permitted in current status: {0}")]
    InvalidStateTransition(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("a rating for this match was already submitted")]
    DuplicateRating,

    #[error("match is not eligible for rating: {0}")]
    NotEligible(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected api response ({status}): {message}")]
    Api { status: u16, message: String },
}

impl EngineError {
    /// Maps a non-success HTTP status plus the backend's error message to
    /// the typed taxonomy. 401 is handled by the session manager before the
    /// response ever reaches this mapping.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => EngineError::Validation(message),
            401 => EngineError::SessionExpired,
            403 => EngineError::Forbidden(message),
            404 => EngineError::NotFound(message),
            409 => EngineError::Conflict(message),
            _ => EngineError::Api { status, message },
        }
    }
}

impl From<ValidationResult> for EngineError {
    fn from(result: ValidationResult) -> Self {
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        EngineError::Validation(error_messages.join(", "))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Network(err.to_string())
    }
}
