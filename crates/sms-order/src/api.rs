//! Backend operations the order flow depends on.

use async_trait::async_trait;
use vtu_api_client::{ApiError, CodeResponse, CreateOrderRequest, Order, VtuApiClient};

/// Order endpoints of the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError>;

    async fn get_order(&self, order_id: &str) -> Result<Order, ApiError>;

    async fn get_code(&self, order_id: &str) -> Result<CodeResponse, ApiError>;

    async fn cancel_order(&self, order_id: &str) -> Result<Order, ApiError>;
}

#[async_trait]
impl OrderApi for VtuApiClient {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        VtuApiClient::create_order(self, request).await
    }

    async fn get_order(&self, order_id: &str) -> Result<Order, ApiError> {
        VtuApiClient::get_order(self, order_id).await
    }

    async fn get_code(&self, order_id: &str) -> Result<CodeResponse, ApiError> {
        VtuApiClient::get_code(self, order_id).await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<Order, ApiError> {
        VtuApiClient::cancel_order(self, order_id).await
    }
}
