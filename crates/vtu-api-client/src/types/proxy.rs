//! Residential proxy management types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub bandwidth_used_mb: u64,
    /// `None` on unmetered plans
    #[serde(default)]
    pub bandwidth_limit_mb: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ProxyProfile {
    /// Bandwidth left on the current plan, if metered.
    pub fn bandwidth_remaining_mb(&self) -> Option<u64> {
        self.bandwidth_limit_mb
            .map(|limit| limit.saturating_sub(self.bandwidth_used_mb))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks5,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyStatus {
    Active,
    Inactive,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyEndpoint {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub protocol: ProxyProtocol,
    #[serde(default)]
    pub country: Option<String>,
    pub status: ProxyStatus,
}

impl ProxyEndpoint {
    /// `scheme://host:port` form accepted by most HTTP clients.
    pub fn url(&self) -> String {
        let scheme = match self.protocol {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks5 => "socks5",
        };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxyStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub bandwidth_used_mb: u64,
    pub active_proxies: u32,
}

impl ProxyStats {
    /// Share of successful requests, `None` before any traffic.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total_requests == 0 {
            None
        } else {
            Some(self.successful_requests as f64 / self.total_requests as f64)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyPlan {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub bandwidth_mb: Option<u64>,
    pub duration_days: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Account-wide proxy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxySettings {
    pub rotation: Option<String>,
    pub sticky_session_minutes: Option<u32>,
    pub default_protocol: Option<ProxyProtocol>,
    pub allowed_countries: Vec<String>,
}

/// A source IP allowed to use the proxies without credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpAuthorization {
    pub ip: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorizeIpRequest {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyActivity {
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_proxy_status() {
        let endpoint: ProxyEndpoint = serde_json::from_value(serde_json::json!({
            "id": "px_1",
            "host": "ng1.proxy.example",
            "port": 8000,
            "protocol": "socks5",
            "status": "suspended"
        }))
        .unwrap();

        assert_eq!(endpoint.status, ProxyStatus::Unknown);
        assert_eq!(endpoint.url(), "socks5://ng1.proxy.example:8000");
    }

    #[test]
    fn test_bandwidth_remaining() {
        let mut profile = ProxyProfile {
            username: "ada".into(),
            email: None,
            plan: Some("starter".into()),
            balance: Decimal::ZERO,
            bandwidth_used_mb: 1500,
            bandwidth_limit_mb: Some(1024),
            expires_at: None,
        };
        assert_eq!(profile.bandwidth_remaining_mb(), Some(0));

        profile.bandwidth_limit_mb = None;
        assert_eq!(profile.bandwidth_remaining_mb(), None);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(ProxyStats::default().success_rate(), None);

        let stats = ProxyStats {
            total_requests: 200,
            successful_requests: 150,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), Some(0.75));
    }
}
