//! API client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Authentication failed")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Empty response from API")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Whether repeating the same request later could succeed.
    ///
    /// Network failures, rate limiting and server-side (5xx) errors are
    /// transient. Everything the backend answered deliberately is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(_) | ApiError::RateLimit => true,
            ApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
