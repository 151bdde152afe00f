//! # Order Events
//!
//! Notifications pushed to the UI shell when a submission settles.
//!
//! ```text
//! OrderSubmitter ──► OrderEventEmitter::order_placed(&OrderPlaced)
//!                         │
//!                         └──► shell navigates to  /account?order=success
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use storefront_core::{Money, OrderId};

/// Page the shell opens after a successful order.
pub const ORDER_SUCCESS_PATH: &str = "/account";

/// Query flag telling that page to show the confirmation banner.
pub const ORDER_SUCCESS_FLAG: &str = "order=success";

/// Where the shell should go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub path: String,
    pub query: String,
}

impl Navigation {
    /// The post-order confirmation page.
    pub fn order_success() -> Self {
        Navigation {
            path: ORDER_SUCCESS_PATH.to_string(),
            query: ORDER_SUCCESS_FLAG.to_string(),
        }
    }

    /// Path and query joined (`/account?order=success`).
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Emitted once per successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub session_id: String,
    pub total_items: i64,
    pub total: Money,
    /// ISO 4217 code; `total` is in its minor units.
    pub currency: String,
    pub navigation: Navigation,
}

/// Receives submission outcomes (implemented by the UI shell).
pub trait OrderEventEmitter: Send + Sync {
    /// An order was placed and the cart cleared.
    fn order_placed(&self, event: &OrderPlaced);

    /// A submission failed. `retryable` is true when the shopper can try
    /// again from review.
    fn order_failed(&self, message: &str, retryable: bool);
}

/// Emitter that drops every event.
pub struct NoOpEmitter;

impl OrderEventEmitter for NoOpEmitter {
    fn order_placed(&self, _event: &OrderPlaced) {}
    fn order_failed(&self, _message: &str, _retryable: bool) {}
}
