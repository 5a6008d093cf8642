//! Client error taxonomy.

use std::time::Duration;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure (DNS, refused connection, reset…).
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend rejected the token or the credentials (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status, with the backend's `message` if present.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the failure means the stored token is no longer usable.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Short text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg) | ApiError::Status { message: msg, .. } => msg.clone(),
            ApiError::Timeout(_) => "The server took too long to respond.".to_string(),
            ApiError::Client(_) | ApiError::Network(_) => "Could not reach the server.".to_string(),
            ApiError::Decode(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
