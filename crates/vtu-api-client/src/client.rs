//! VTU backend HTTP client.

use crate::error::ApiError;
use crate::types::*;
use crate::validation;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Client for the VTU / SMS-verification / proxy REST API.
///
/// The API key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
#[derive(Clone)]
pub struct VtuApiClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl VtuApiClient {
    /// Create a new API client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.map(SecretString::new),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the API is reachable.
    pub async fn health_check(&self) -> bool {
        self.request(Method::GET, "/health")
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    // ---- SMS verification ----

    #[instrument(skip(self))]
    pub async fn list_countries(&self) -> Result<Vec<Country>, ApiError> {
        self.get("/sms/countries", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn list_services(&self, country: &str) -> Result<Vec<SmsService>, ApiError> {
        self.get("/sms/services", &[("country", country)]).await
    }

    #[instrument(skip(self))]
    pub async fn list_providers(
        &self,
        country: &str,
        service: &str,
    ) -> Result<Vec<Provider>, ApiError> {
        self.get("/sms/providers", &[("country", country), ("service", service)])
            .await
    }

    /// Request a virtual number. Never retried: the endpoint is not known
    /// to be idempotent.
    #[instrument(skip(self, request), fields(country = %request.country, service = %request.service, mode = %request.mode))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        let order: Order = self.post("/sms/orders", request).await?;
        debug!(order_id = %order.id, phone = %order.phone_number, "Order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.get(&format!("/sms/orders/{}", encode(order_id)), &[])
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_code(&self, order_id: &str) -> Result<CodeResponse, ApiError> {
        self.get(&format!("/sms/orders/{}/code", encode(order_id)), &[])
            .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.post(
            &format!("/sms/orders/{}/cancel", encode(order_id)),
            &serde_json::json!({}),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn sms_stats(&self) -> Result<SmsStats, ApiError> {
        self.get("/sms/stats", &[]).await
    }

    // ---- VTU ----

    #[instrument(skip(self))]
    pub async fn list_networks(&self) -> Result<Vec<Network>, ApiError> {
        self.get("/vtu/networks", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn list_bundles(&self, network: NetworkCode) -> Result<Vec<DataBundle>, ApiError> {
        self.get("/vtu/bundles", &[("network", network.as_str())])
            .await
    }

    /// Buy airtime after validating the number and amount locally.
    #[instrument(skip(self, request), fields(network = %request.network, amount = request.amount))]
    pub async fn buy_airtime(&self, request: &AirtimeRequest) -> Result<Transaction, ApiError> {
        validation::validate_airtime_amount(request.amount).map_err(ApiError::Validation)?;
        let request = AirtimeRequest {
            phone: validation::normalize_phone_number(&request.phone)
                .map_err(ApiError::Validation)?,
            ..request.clone()
        };

        self.post("/vtu/airtime", &request).await
    }

    #[instrument(skip(self, request), fields(network = %request.network, bundle = %request.bundle_id))]
    pub async fn buy_data(&self, request: &DataRequest) -> Result<Transaction, ApiError> {
        if request.bundle_id.trim().is_empty() {
            return Err(ApiError::Validation("Bundle id is required".into()));
        }
        let request = DataRequest {
            phone: validation::normalize_phone_number(&request.phone)
                .map_err(ApiError::Validation)?,
            ..request.clone()
        };

        self.post("/vtu/data", &request).await
    }

    #[instrument(skip(self))]
    pub async fn wallet_balance(&self) -> Result<WalletBalance, ApiError> {
        self.get("/wallet/balance", &[]).await
    }

    // ---- Proxy ----

    #[instrument(skip(self))]
    pub async fn proxy_profile(&self) -> Result<ProxyProfile, ApiError> {
        self.get("/proxy/profile", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn list_proxies(&self) -> Result<Vec<ProxyEndpoint>, ApiError> {
        self.get("/proxy/list", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn proxy_stats(&self) -> Result<ProxyStats, ApiError> {
        self.get("/proxy/stats", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn proxy_plans(&self) -> Result<Vec<ProxyPlan>, ApiError> {
        self.get("/proxy/plans", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn proxy_settings(&self) -> Result<ProxySettings, ApiError> {
        self.get("/proxy/config", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn authorized_ips(&self) -> Result<Vec<IpAuthorization>, ApiError> {
        self.get("/proxy/ip-authorization", &[]).await
    }

    #[instrument(skip(self))]
    pub async fn authorize_ip(
        &self,
        ip: &str,
        label: Option<&str>,
    ) -> Result<IpAuthorization, ApiError> {
        let request = AuthorizeIpRequest {
            ip: validation::validate_ip(ip).map_err(ApiError::Validation)?,
            label: label.map(String::from),
        };

        self.post("/proxy/ip-authorization", &request).await
    }

    #[instrument(skip(self))]
    pub async fn revoke_ip(&self, ip: &str) -> Result<(), ApiError> {
        let ip = validation::validate_ip(ip).map_err(ApiError::Validation)?;
        let response = self
            .request(
                Method::DELETE,
                &format!("/proxy/ip-authorization/{}", encode(&ip)),
            )
            .send()
            .await?;

        self.handle_response::<serde_json::Value>(response)
            .await?
            .into_unit()
    }

    #[instrument(skip(self))]
    pub async fn proxy_activities(&self, limit: u32) -> Result<Vec<ProxyActivity>, ApiError> {
        let limit = limit.to_string();
        self.get("/proxy/activities", &[("limit", limit.as_str())])
            .await
    }

    // ---- plumbing ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");

        match &self.api_key {
            Some(key) => builder.header(
                "Authorization",
                format!("Bearer {}", key.expose_secret()),
            ),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path).query(query).send().await?;

        self.handle_response(response).await?.into_result()
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path).json(body).send().await?;

        self.handle_response(response).await?.into_result()
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<ApiResponse<T>, ApiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", truncate(&body, 200));
            serde_json::from_str(&body).map_err(ApiError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.clone()
            }
        });

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                ApiError::RateLimit
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Authentication failed");
                ApiError::Unauthorized
            }
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => {
                warn!(status = %status, "API request failed: {}", message);
                ApiError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Pull the `message` out of an error envelope, if the body is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_trailing_slash() {
        let client =
            VtuApiClient::new("http://localhost:8000/api/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"success": false, "message": "Insufficient wallet balance"}"#;
        assert_eq!(
            error_message(body),
            Some("Insufficient wallet balance".to_string())
        );
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("₦₦₦", 2), "₦₦");
        assert_eq!(truncate("short", 200), "short");
    }
}
