//! Request and response types for the VTU REST API.

mod proxy;
mod sms;
mod vtu;

pub use proxy::*;
pub use sms::*;
pub use vtu::*;

use crate::error::ApiError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Envelope wrapping every response body.
///
/// `success == false` means the backend understood the request and refused
/// it; `message` then carries the reason shown to the user.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, turning refusals and missing data into errors.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "Request rejected".into()),
            ));
        }
        self.data.ok_or(ApiError::EmptyResponse)
    }

    /// Check the envelope for endpoints whose payload is irrelevant.
    pub fn into_unit(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "Request rejected".into()),
            ))
        }
    }
}

/// Wallet balance backing every purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletBalance {
    pub balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

pub(crate) fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "NGN".into()
}
