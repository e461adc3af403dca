//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("{0}")]
    Api(#[from] vtu_api_client::ApiError),

    #[error("{0}")]
    Order(#[from] sms_order::OrderError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
