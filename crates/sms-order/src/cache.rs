//! Read-only local copy of orders known to this session.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use vtu_api_client::{Order, OrderStatus};

/// Shared cache of orders, keyed by order id.
///
/// The backend is authoritative. The cache only refuses updates that would
/// break the two rules visible client-side: status never leaves a terminal
/// state, and an order keeps the first code it received.
#[derive(Clone, Default)]
pub struct OrderCache {
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().await.get(order_id).cloned()
    }

    /// Merge a backend copy of an order and return the cached result.
    pub async fn apply(&self, incoming: Order) -> Order {
        let mut orders = self.orders.write().await;

        let merged = match orders.get(&incoming.id) {
            Some(cached) => merge(cached, incoming),
            None => {
                debug!(order_id = %incoming.id, status = %incoming.status, "Caching order");
                normalize(incoming)
            }
        };

        orders.insert(merged.id.clone(), merged.clone());
        merged
    }

    /// Attach a delivered code to a cached order.
    pub async fn record_code(&self, order_id: &str, code: &str) -> Option<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(order_id)?;

        match order.code.as_deref() {
            Some(existing) if existing != code => {
                warn!(order_id, "Ignoring second code for order");
            }
            Some(_) => {}
            None => order.code = Some(code.to_string()),
        }
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::CodeReceived;
        }

        Some(order.clone())
    }

    /// Move a cached order to `status` if the transition is allowed.
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Option<Order> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(order_id)?;

        if order.status.can_transition_to(status) {
            order.status = status;
        } else {
            warn!(order_id, from = %order.status, to = %status, "Ignoring status regression");
        }

        Some(order.clone())
    }

    pub async fn remove(&self, order_id: &str) -> Option<Order> {
        self.orders.write().await.remove(order_id)
    }
}

fn merge(cached: &Order, incoming: Order) -> Order {
    let mut merged = incoming;

    if !cached.status.can_transition_to(merged.status) {
        warn!(
            order_id = %merged.id,
            from = %cached.status,
            to = %merged.status,
            "Ignoring status regression"
        );
        merged.status = cached.status;
    }

    merged.code = match (cached.code.clone(), merged.code.take()) {
        (Some(first), Some(second)) if first != second => {
            warn!(order_id = %merged.id, "Ignoring second code for order");
            Some(first)
        }
        (Some(first), _) => Some(first),
        (None, incoming) => incoming,
    };

    normalize(merged)
}

/// A code implies the order left `pending`.
fn normalize(mut order: Order) -> Order {
    if order.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
        order.code = None;
    }
    if order.code.is_some() && order.status == OrderStatus::Pending {
        order.status = OrderStatus::CodeReceived;
    }
    order
}
