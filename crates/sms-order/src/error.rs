//! Order flow errors.

use thiserror::Error;
use vtu_api_client::{ApiError, OrderStatus};

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("No code received after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Order closed with status {status}")]
    OrderClosed { status: OrderStatus },

    #[error("Polling cancelled")]
    Cancelled,

    #[error("Order not found: {0}")]
    NotFound(String),
}
