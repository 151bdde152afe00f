//! # Order Submitter
//!
//! Places the order for a checkout session, at most one call at a time.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit()                                                              │
//! │    │                                                                    │
//! │    ├── snapshot cart                                                    │
//! │    ├── begin_submission ── Review? lock free? items? ──► no: reject     │
//! │    │      (lock taken, step = Submitting)                               │
//! │    │                                                                    │
//! │    ├── spawn place_order(cart, shipping)                                │
//! │    │                                                                    │
//! │    ├── select ─┬─ token cancelled ─────────────────► Cancelled          │
//! │    │           └─ call finished                                         │
//! │    │                  │                                                 │
//! │    │      session replaced meanwhile? ─────────────► Cancelled          │
//! │    │                  │                                                 │
//! │    │        ┌─────────┼──────────────┐                                  │
//! │    │        ▼         ▼              ▼                                  │
//! │    │       Ok       Err          panicked                               │
//! │    │   clear cart   Failed        Failed                                │
//! │    │   Succeeded    Rejected      ServiceFault                          │
//! │    │   emit event                                                       │
//! │    │                                                                    │
//! │    └── SubmissionGuard: if submit() is dropped midway, aborts the call  │
//! │        and moves the session to Failed                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::task::AbortHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use storefront_core::OrderId;

use crate::config::DEFAULT_CURRENCY;
use crate::controller::CheckoutController;
use crate::error::{SubmitError, SubmitResult};
use crate::events::{Navigation, OrderEventEmitter, OrderPlaced};
use crate::order_service::OrderService;

// =============================================================================
// Submission Guard
// =============================================================================

/// Releases the single-flight lock on every exit path.
///
/// Until `settle` is called, dropping the guard aborts the order call and
/// records a failed submission.
struct SubmissionGuard<'a> {
    controller: &'a CheckoutController,
    session_id: Uuid,
    call: Option<AbortHandle>,
    armed: bool,
}

impl<'a> SubmissionGuard<'a> {
    fn new(controller: &'a CheckoutController, session_id: Uuid) -> Self {
        SubmissionGuard {
            controller,
            session_id,
            call: None,
            armed: true,
        }
    }

    fn track(&mut self, call: AbortHandle) {
        self.call = Some(call);
    }

    /// Records the outcome. Returns `false` if the session was replaced.
    fn settle(&mut self, succeeded: bool) -> bool {
        self.armed = false;
        self.controller.complete_submission(self.session_id, succeeded)
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if let Some(call) = &self.call {
            call.abort();
        }

        if self.controller.complete_submission(self.session_id, false) {
            warn!(session_id = %self.session_id, "Order submission interrupted; session marked failed");
        }
    }
}

// =============================================================================
// Order Submitter
// =============================================================================

/// Submits the order for one checkout controller.
pub struct OrderSubmitter {
    controller: Arc<CheckoutController>,
    service: Arc<dyn OrderService>,
    emitter: Arc<dyn OrderEventEmitter>,
    currency: String,
}

impl OrderSubmitter {
    pub fn new(
        controller: Arc<CheckoutController>,
        service: Arc<dyn OrderService>,
        emitter: Arc<dyn OrderEventEmitter>,
    ) -> Self {
        OrderSubmitter {
            controller,
            service,
            emitter,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Sets the currency reported in [`OrderPlaced`].
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn controller(&self) -> &Arc<CheckoutController> {
        &self.controller
    }

    /// Places the order.
    ///
    /// ## Errors
    /// - `NotReady` / `EmptyCart` / `AlreadySubmitting`: refused up front,
    ///   no side effects and no order service call
    /// - `Rejected` / `ServiceFault`: the session is at Failed; cart and
    ///   form data are kept for a retry
    /// - `Cancelled`: the session was reset while the call was in flight;
    ///   the result, if any, was discarded
    pub async fn submit(&self) -> SubmitResult<OrderId> {
        let cart = self.controller.cart().snapshot().await;
        let ticket = self.controller.begin_submission(cart.is_empty())?;
        let session_id = ticket.session_id;

        let mut guard = SubmissionGuard::new(&self.controller, session_id);

        let service = Arc::clone(&self.service);
        let order_cart = cart.clone();
        let shipping = ticket.shipping;
        let mut call = tokio::spawn(async move { service.place_order(&order_cart, &shipping).await });
        guard.track(call.abort_handle());

        let joined = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => {
                info!(session_id = %session_id, "Order submission cancelled");
                return Err(SubmitError::Cancelled);
            }
            joined = &mut call => joined,
        };

        match joined {
            Ok(Ok(order_id)) => {
                if !guard.settle(true) {
                    info!(session_id = %session_id, order_id = %order_id, "Discarding order result for abandoned session");
                    return Err(SubmitError::Cancelled);
                }

                self.controller.cart().clear().await;

                let summary = cart.summary(self.controller.tax_rate());
                let event = OrderPlaced {
                    order_id: order_id.clone(),
                    session_id: session_id.to_string(),
                    total_items: cart.total_items(),
                    total: summary.total,
                    currency: self.currency.clone(),
                    navigation: Navigation::order_success(),
                };
                self.emitter.order_placed(&event);

                info!(
                    session_id = %session_id,
                    order_id = %order_id,
                    total = %summary.total,
                    currency = %self.currency,
                    "Order placed"
                );
                Ok(order_id)
            }
            Ok(Err(order_error)) => {
                if !guard.settle(false) {
                    return Err(SubmitError::Cancelled);
                }

                warn!(session_id = %session_id, error = %order_error, "Order rejected");
                let err = SubmitError::Rejected(order_error);
                self.emitter.order_failed(&err.to_string(), err.is_retryable());
                Err(err)
            }
            Err(join_error) => {
                if !guard.settle(false) {
                    return Err(SubmitError::Cancelled);
                }

                let reason = if join_error.is_panic() {
                    "order service panicked".to_string()
                } else {
                    join_error.to_string()
                };
                error!(session_id = %session_id, reason = %reason, "Order service fault");

                let err = SubmitError::ServiceFault(reason);
                self.emitter.order_failed(&err.to_string(), err.is_retryable());
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for OrderSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSubmitter")
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart_store::tests::{memory_repository, product};
    use crate::cart_store::CartStore;
    use crate::controller::tests::{controller, walk_to_review};
    use crate::error::OrderError;
    use crate::order_service::SimulatedOrderService;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use storefront_core::{Cart, CheckoutStep, ShippingInfo};
    use tokio::sync::Notify;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Blocks inside `place_order` until released.
    #[derive(Default)]
    struct GatedService {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl OrderService for GatedService {
        async fn place_order(&self, _cart: &Cart, _shipping: &ShippingInfo) -> Result<OrderId, OrderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.entered.notify_one();
            self.release.notified().await;
            Ok(OrderId(format!("gated-{}", n)))
        }
    }

    /// Fails the first call, succeeds afterwards.
    #[derive(Default)]
    struct FlakyService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderService for FlakyService {
        async fn place_order(&self, _cart: &Cart, _shipping: &ShippingInfo) -> Result<OrderId, OrderError> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(OrderError::Unavailable("503 from upstream".to_string())),
                _ => Ok(OrderId("ord-2".to_string())),
            }
        }
    }

    struct PanickingService;

    #[async_trait]
    impl OrderService for PanickingService {
        async fn place_order(&self, _cart: &Cart, _shipping: &ShippingInfo) -> Result<OrderId, OrderError> {
            panic!("order backend exploded");
        }
    }

    #[derive(Default)]
    struct RecordingEmitter {
        placed: Mutex<Vec<OrderPlaced>>,
        failed: Mutex<Vec<(String, bool)>>,
    }

    impl OrderEventEmitter for RecordingEmitter {
        fn order_placed(&self, event: &OrderPlaced) {
            self.placed.lock().unwrap().push(event.clone());
        }

        fn order_failed(&self, message: &str, retryable: bool) {
            self.failed.lock().unwrap().push((message.to_string(), retryable));
        }
    }

    struct Harness {
        controller: Arc<CheckoutController>,
        submitter: Arc<OrderSubmitter>,
        emitter: Arc<RecordingEmitter>,
    }

    impl Harness {
        async fn at_review(service: Arc<dyn OrderService>) -> Self {
            let harness = Harness::at_shipping(service).await;
            walk_to_review(&harness.controller);
            harness
        }

        async fn at_shipping(service: Arc<dyn OrderService>) -> Self {
            let cart = Arc::new(CartStore::new(memory_repository()));
            cart.add(&product("boots", 8999), 1).await.unwrap();
            cart.add(&product("socks", 500), 2).await.unwrap();

            let controller = Arc::new(controller(cart));
            let emitter = Arc::new(RecordingEmitter::default());
            let submitter = Arc::new(OrderSubmitter::new(
                controller.clone(),
                service,
                emitter.clone(),
            ));

            Harness {
                controller,
                submitter,
                emitter,
            }
        }

        async fn cart_len(&self) -> usize {
            self.controller.cart().len().await
        }
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_clears_cart_and_emits_event() {
        let service = Arc::new(FlakyService {
            calls: AtomicUsize::new(1),
        });
        let h = Harness::at_review(service).await;

        let order_id = h.submitter.submit().await.unwrap();

        assert_eq!(order_id, OrderId("ord-2".to_string()));
        assert_eq!(h.controller.step(), CheckoutStep::Succeeded);
        assert!(!h.controller.is_submitting());
        assert_eq!(h.cart_len().await, 0);

        let placed = h.emitter.placed.lock().unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].order_id, order_id);
        assert_eq!(placed[0].total_items, 3);
        // (8999 + 2 × 500) + 10% tax
        assert_eq!(placed[0].total.cents(), 10999);
        assert_eq!(placed[0].currency, "USD");
        assert_eq!(placed[0].navigation.href(), "/account?order=success");
    }

    #[tokio::test]
    async fn test_failure_keeps_cart_and_allows_retry() {
        let service = Arc::new(FlakyService::default());
        let h = Harness::at_review(service.clone()).await;

        let err = h.submitter.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Rejected(OrderError::Unavailable(_))));
        assert_eq!(h.controller.step(), CheckoutStep::Failed);
        assert!(!h.controller.is_submitting());
        assert_eq!(h.cart_len().await, 2);
        assert_eq!(h.controller.session().shipping_info().first_name, "Alan");
        assert_eq!(h.emitter.failed.lock().unwrap().len(), 1);

        // Submitting from Failed is refused without a call
        assert!(matches!(
            h.submitter.submit().await,
            Err(SubmitError::NotReady { step: CheckoutStep::Failed })
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        assert_eq!(h.controller.retry(), CheckoutStep::Review);
        assert!(h.submitter.submit().await.is_ok());
        assert_eq!(h.cart_len().await, 0);
    }

    #[tokio::test]
    async fn test_refused_outside_review() {
        let service = Arc::new(GatedService::default());
        let h = Harness::at_shipping(service.clone()).await;

        let err = h.submitter.submit().await.unwrap_err();
        assert_eq!(err.code(), "NOT_READY");
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.controller.step(), CheckoutStep::Shipping);
    }

    #[tokio::test]
    async fn test_refused_for_empty_cart() {
        let service = Arc::new(GatedService::default());
        let h = Harness::at_review(service.clone()).await;
        h.controller.cart().clear().await;

        assert!(matches!(h.submitter.submit().await, Err(SubmitError::EmptyCart)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.controller.step(), CheckoutStep::Review);
        assert!(!h.controller.is_submitting());
    }

    #[tokio::test]
    async fn test_single_flight() {
        let service = Arc::new(GatedService::default());
        let h = Harness::at_review(service.clone()).await;

        let first = {
            let submitter = h.submitter.clone();
            tokio::spawn(async move { submitter.submit().await })
        };
        service.entered.notified().await;

        assert!(h.controller.is_submitting());
        assert!(matches!(
            h.submitter.submit().await,
            Err(SubmitError::AlreadySubmitting)
        ));

        service.release.notify_one();
        let order_id = first.await.unwrap().unwrap();

        assert_eq!(order_id, OrderId("gated-1".to_string()));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.controller.step(), CheckoutStep::Succeeded);
    }

    #[tokio::test]
    async fn test_abandon_discards_in_flight_result() {
        let service = Arc::new(GatedService::default());
        let h = Harness::at_review(service.clone()).await;
        let abandoned = h.controller.session_id();

        let pending = {
            let submitter = h.submitter.clone();
            tokio::spawn(async move { submitter.submit().await })
        };
        service.entered.notified().await;

        h.controller.abandon();
        service.release.notify_one();

        assert!(matches!(pending.await.unwrap(), Err(SubmitError::Cancelled)));
        assert_ne!(h.controller.session_id(), abandoned);
        assert_eq!(h.controller.step(), CheckoutStep::Shipping);
        assert!(!h.controller.is_submitting());
        assert_eq!(h.cart_len().await, 2);
        assert!(h.emitter.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_service_panic_releases_lock() {
        let h = Harness::at_review(Arc::new(PanickingService)).await;

        let err = h.submitter.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::ServiceFault(_)));
        assert!(err.is_retryable());
        assert_eq!(h.controller.step(), CheckoutStep::Failed);
        assert!(!h.controller.is_submitting());
        assert_eq!(h.cart_len().await, 2);
    }

    #[tokio::test]
    async fn test_dropped_submit_releases_lock() {
        let service = Arc::new(GatedService::default());
        let h = Harness::at_review(service.clone()).await;

        let pending = {
            let submitter = h.submitter.clone();
            tokio::spawn(async move { submitter.submit().await })
        };
        service.entered.notified().await;

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        assert_eq!(h.controller.step(), CheckoutStep::Failed);
        assert!(!h.controller.is_submitting());
        assert_eq!(h.controller.retry(), CheckoutStep::Review);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_service_end_to_end() {
        let service = Arc::new(SimulatedOrderService::new(Duration::from_millis(2000)));
        let h = Harness::at_review(service).await;

        let order_id = h.submitter.submit().await.unwrap();

        assert!(!order_id.0.is_empty());
        assert_eq!(h.controller.step(), CheckoutStep::Succeeded);
        assert_eq!(h.cart_len().await, 0);
    }
}
