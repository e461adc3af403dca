//! Virtual number order creation.

use crate::api::OrderApi;
use crate::cache::OrderCache;
use crate::error::OrderError;
use crate::poller::{CodePoller, PollConfig};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use vtu_api_client::{ApiError, CreateOrderRequest, Order, SelectionMode};

/// What the caller wants a number for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub country: String,
    pub service: String,
    pub mode: SelectionMode,
    pub provider: Option<String>,
}

impl OrderRequest {
    /// Let the backend choose the provider.
    pub fn auto(country: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            service: service.into(),
            mode: SelectionMode::Auto,
            provider: None,
        }
    }

    /// Use a specific provider.
    pub fn manual(
        country: impl Into<String>,
        service: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            service: service.into(),
            mode: SelectionMode::Manual,
            provider: Some(provider.into()),
        }
    }

    /// Validate and build the wire request.
    pub fn to_create_request(&self) -> Result<CreateOrderRequest, OrderError> {
        let country = self.country.trim();
        let service = self.service.trim();
        let provider = self
            .provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        if country.is_empty() {
            return Err(OrderError::Validation("Country is required".into()));
        }
        if service.is_empty() {
            return Err(OrderError::Validation("Service is required".into()));
        }

        let provider = match (self.mode, provider) {
            (SelectionMode::Manual, None) => {
                return Err(OrderError::Validation(
                    "Manual mode requires a provider".into(),
                ));
            }
            (SelectionMode::Manual, Some(p)) => Some(p.to_string()),
            (SelectionMode::Auto, Some(p)) => {
                debug!(provider = p, "Ignoring provider in auto mode");
                None
            }
            (SelectionMode::Auto, None) => None,
        };

        Ok(CreateOrderRequest {
            country: country.to_string(),
            service: service.to_string(),
            mode: self.mode,
            provider,
        })
    }
}

/// Creates, refreshes and cancels virtual number orders.
///
/// Creation is never retried here. The backend gives no idempotency
/// guarantee, so a blind retry could rent two numbers.
#[derive(Clone)]
pub struct OrderRequester {
    api: Arc<dyn OrderApi>,
    cache: OrderCache,
}

impl OrderRequester {
    pub fn new(api: Arc<dyn OrderApi>) -> Self {
        Self::with_cache(api, OrderCache::new())
    }

    pub fn with_cache(api: Arc<dyn OrderApi>, cache: OrderCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &OrderCache {
        &self.cache
    }

    /// A code poller sharing this requester's backend and cache.
    pub fn poller(&self, config: PollConfig) -> CodePoller {
        CodePoller::with_cache(self.api.clone(), self.cache.clone(), config)
    }

    /// Rent a virtual number.
    #[instrument(skip(self, request), fields(country = %request.country, service = %request.service, mode = %request.mode))]
    pub async fn request(&self, request: &OrderRequest) -> Result<Order, OrderError> {
        let create = request.to_create_request()?;
        let order = self.api.create_order(&create).await?;

        info!(
            order_id = %order.id,
            phone = %order.phone_number,
            expires_at = %order.expires_at,
            "Virtual number assigned"
        );

        Ok(self.cache.apply(order).await)
    }

    /// Re-read an order from the backend.
    #[instrument(skip(self))]
    pub async fn refresh(&self, order_id: &str) -> Result<Order, OrderError> {
        match self.api.get_order(order_id).await {
            Ok(order) => Ok(self.cache.apply(order).await),
            Err(ApiError::NotFound(_)) => {
                self.cache.remove(order_id).await;
                Err(OrderError::NotFound(order_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel an order that is still pending.
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: &str) -> Result<Order, OrderError> {
        if let Some(cached) = self.cache.get(order_id).await {
            if cached.status.is_terminal() {
                return Err(OrderError::OrderClosed {
                    status: cached.status,
                });
            }
        }

        let order = match self.api.cancel_order(order_id).await {
            Ok(order) => order,
            Err(ApiError::NotFound(_)) => return Err(OrderError::NotFound(order_id.to_string())),
            Err(e) => return Err(e.into()),
        };

        info!(order_id, status = %order.status, "Order cancelled");
        Ok(self.cache.apply(order).await)
    }

    pub async fn cached(&self, order_id: &str) -> Option<Order> {
        self.cache.get(order_id).await
    }
}
