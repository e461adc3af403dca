//! Virtual number (SMS verification) types.

use super::default_true;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a virtual number order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Number assigned, waiting for an SMS
    Pending,
    /// Verification code delivered
    CodeReceived,
    /// Rental window elapsed without a code
    Expired,
    /// Cancelled by the user or the provider
    Cancelled,
}

impl OrderStatus {
    /// Terminal statuses never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == next || self == OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::CodeReceived => "code_received",
            OrderStatus::Expired => "expired",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// How the SMS provider for an order is chosen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Backend picks the provider
    #[default]
    Auto,
    /// Caller names the provider explicitly
    Manual,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Auto => f.write_str("auto"),
            SelectionMode::Manual => f.write_str("manual"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SelectionMode::Auto),
            "manual" => Ok(SelectionMode::Manual),
            other => Err(format!("unknown selection mode '{}'", other)),
        }
    }
}

/// A rented virtual phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub phone_number: String,
    pub service: String,
    pub country: String,
    pub cost: Decimal,
    pub status: OrderStatus,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub mode: SelectionMode,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }
}

/// Body of the order creation request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateOrderRequest {
    pub country: String,
    pub service: String,
    pub mode: SelectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Answer of the code endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodeResponse {
    #[serde(default)]
    pub code: Option<String>,
    pub status: OrderStatus,
}

impl CodeResponse {
    /// The delivered code; blank strings count as absent.
    pub fn code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub dial_code: Option<String>,
}

/// A service a virtual number can receive codes for (WhatsApp, Telegram...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmsService {
    pub code: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// An upstream SMS provider, selectable in manual mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub success_rate: Option<f32>,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmsStats {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub pending_orders: u64,
    pub cancelled_orders: u64,
    pub total_spent: Decimal,
}
