//! Airtime and data top-up types.

use super::default_true;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nigerian mobile network operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NetworkCode {
    #[serde(rename = "mtn")]
    Mtn,
    #[serde(rename = "airtel")]
    Airtel,
    #[serde(rename = "glo")]
    Glo,
    #[serde(rename = "9mobile", alias = "etisalat")]
    NineMobile,
}

impl NetworkCode {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkCode::Mtn => "mtn",
            NetworkCode::Airtel => "airtel",
            NetworkCode::Glo => "glo",
            NetworkCode::NineMobile => "9mobile",
        }
    }
}

impl fmt::Display for NetworkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mtn" => Ok(NetworkCode::Mtn),
            "airtel" => Ok(NetworkCode::Airtel),
            "glo" => Ok(NetworkCode::Glo),
            "9mobile" | "etisalat" => Ok(NetworkCode::NineMobile),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Network {
    pub code: NetworkCode,
    pub name: String,
    #[serde(default = "default_true")]
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataBundle {
    pub id: String,
    pub network: NetworkCode,
    pub name: String,
    /// Human readable volume, e.g. "1.5GB"
    pub size: String,
    /// Human readable validity, e.g. "30 days"
    pub validity: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AirtimeRequest {
    pub network: NetworkCode,
    pub phone: String,
    /// Whole naira
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataRequest {
    pub network: NetworkCode,
    pub phone: String,
    pub bundle_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Airtime,
    Data,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Successful,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Successful => f.write_str("successful"),
            TransactionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Result of a top-up purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub reference: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub phone: String,
    pub network: NetworkCode,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
