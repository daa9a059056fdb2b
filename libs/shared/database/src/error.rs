use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Transport failures and 5xx answers; safe to repeat for reads only.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Auth(msg) => AppError::Unauthorized(msg),
            StoreError::Decode(msg) => AppError::Internal(msg),
            StoreError::Api { status: 409 | 422, message } => AppError::InvalidReference(message),
            StoreError::Api { status: 400..=499, message } => AppError::BadRequest(message),
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}
