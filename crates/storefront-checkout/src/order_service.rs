//! # Order Service
//!
//! The collaborator that actually places an order.
//!
//! A real deployment plugs in a client for its order backend.
//! [`SimulatedOrderService`] stands in for one: it waits a configurable
//! latency and confirms every order with a fresh UUID.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use storefront_core::{Cart, OrderId, ShippingInfo};

use crate::error::OrderError;

/// Places orders.
///
/// Called at most once per submission attempt, under the session's
/// single-flight lock.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Places an order for `cart`, shipped to `shipping`.
    async fn place_order(&self, cart: &Cart, shipping: &ShippingInfo) -> Result<OrderId, OrderError>;
}

/// Order service that confirms every order after a delay.
#[derive(Debug, Clone)]
pub struct SimulatedOrderService {
    latency: Duration,
    rejection: Option<String>,
}

impl SimulatedOrderService {
    /// Confirms orders after `latency`.
    pub fn new(latency: Duration) -> Self {
        SimulatedOrderService {
            latency,
            rejection: None,
        }
    }

    /// Rejects every order with `reason` after `latency`.
    pub fn rejecting(latency: Duration, reason: impl Into<String>) -> Self {
        SimulatedOrderService {
            latency,
            rejection: Some(reason.into()),
        }
    }
}

impl Default for SimulatedOrderService {
    fn default() -> Self {
        SimulatedOrderService::new(Duration::from_millis(2000))
    }
}

#[async_trait]
impl OrderService for SimulatedOrderService {
    async fn place_order(&self, cart: &Cart, shipping: &ShippingInfo) -> Result<OrderId, OrderError> {
        debug!(
            items = cart.len(),
            country = %shipping.country,
            latency_ms = self.latency.as_millis() as u64,
            "Simulating order placement"
        );

        tokio::time::sleep(self.latency).await;

        if let Some(reason) = &self.rejection {
            return Err(OrderError::Rejected(reason.clone()));
        }

        let order_id = OrderId(Uuid::new_v4().to_string());
        info!(order_id = %order_id, total = %cart.total_price(), "Simulated order placed");
        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart_store::tests::product;
    use tokio::time::Instant;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&product("lamp", 4500), 1).unwrap();
        cart
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_service_waits_then_confirms() {
        let service = SimulatedOrderService::default();
        let started = Instant::now();

        let order_id = service
            .place_order(&cart(), &ShippingInfo::default())
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert!(Uuid::parse_str(&order_id.0).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_order_gets_a_new_id() {
        let service = SimulatedOrderService::new(Duration::from_millis(10));
        let first = service.place_order(&cart(), &ShippingInfo::default()).await.unwrap();
        let second = service.place_order(&cart(), &ShippingInfo::default()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejecting_service() {
        let service = SimulatedOrderService::rejecting(Duration::ZERO, "card declined");
        let err = service
            .place_order(&cart(), &ShippingInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err, OrderError::Rejected("card declined".to_string()));
    }
}
