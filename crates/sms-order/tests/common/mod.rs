//! Common test utilities for order flow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use sms_order::OrderApi;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use vtu_api_client::{
    ApiError, CodeResponse, CreateOrderRequest, Order, OrderStatus,
};

/// Order backend that answers code requests from a script and records
/// when each request arrived. Once the script is exhausted it answers
/// "pending" forever.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<VecDeque<Result<CodeResponse, ApiError>>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedApi {
    pub fn pending_forever() -> Self {
        Self::default()
    }

    pub fn code_after(pending_answers: usize, code: &str) -> Self {
        let api = Self::default();
        {
            let mut script = api.script.lock().unwrap();
            for _ in 0..pending_answers {
                script.push_back(Ok(pending()));
            }
            script.push_back(Ok(CodeResponse {
                code: Some(code.to_string()),
                status: OrderStatus::CodeReceived,
            }));
        }
        api
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderApi for ScriptedApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        Ok(Order {
            id: "ord_test".into(),
            phone_number: "+2349012345678".into(),
            service: request.service.clone(),
            country: request.country.clone(),
            cost: Decimal::from(450),
            status: OrderStatus::Pending,
            expires_at: "2030-01-01T00:20:00Z".parse().unwrap(),
            provider: request.provider.clone(),
            mode: request.mode,
            code: None,
            created_at: None,
        })
    }

    async fn get_order(&self, order_id: &str) -> Result<Order, ApiError> {
        Err(ApiError::NotFound(order_id.to_string()))
    }

    async fn get_code(&self, _order_id: &str) -> Result<CodeResponse, ApiError> {
        self.calls.lock().unwrap().push(Instant::now());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(pending()))
    }

    async fn cancel_order(&self, order_id: &str) -> Result<Order, ApiError> {
        Err(ApiError::NotFound(order_id.to_string()))
    }
}

pub fn pending() -> CodeResponse {
    CodeResponse {
        code: None,
        status: OrderStatus::Pending,
    }
}

/// Paused-clock timers fire on whole milliseconds.
pub fn assert_close(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(1);
    assert!(
        actual >= expected && actual <= expected + tolerance,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
