//! # Checkout Controller
//!
//! Owns one shopper's checkout session: form edits, step navigation, and the
//! session-level half of the single-flight submission lock.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin(identity) ──► ActiveSession { id, CheckoutSession, token }      │
//! │                            │                                            │
//! │         set_*_field, next_step, prev_step, edit_*, retry                │
//! │                            │                                            │
//! │                            ▼                                            │
//! │           OrderSubmitter ──► begin_submission ──► complete_submission   │
//! │                                                                         │
//! │  reset() / abandon()                                                   │
//! │       │                                                                 │
//! │       ├──► token.cancel()     (in-flight submit returns Cancelled)      │
//! │       └──► fresh ActiveSession with a new id                            │
//! │             (late results for the old id are discarded)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session sits behind a std `Mutex` that is never held across an
//! `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use storefront_core::validation::{payment_errors, shipping_errors};
use storefront_core::{
    CheckoutSession, CheckoutStep, CoreError, OrderSummary, PaymentField, ShippingField, ShippingInfo, TaxRate,
    UserIdentity, ValidationError,
};

use crate::cart_store::CartStore;
use crate::error::{CheckoutError, CheckoutResult, SubmitResult};

// =============================================================================
// Active Session
// =============================================================================

struct ActiveSession {
    id: Uuid,
    session: CheckoutSession,
    token: CancellationToken,
}

impl ActiveSession {
    fn start(identity: &UserIdentity, default_country: &str) -> Self {
        ActiveSession {
            id: Uuid::new_v4(),
            session: CheckoutSession::new(default_country, identity.email.as_deref()),
            token: CancellationToken::new(),
        }
    }
}

/// What the submitter needs once the lock is taken.
pub(crate) struct SubmissionTicket {
    pub session_id: Uuid,
    pub token: CancellationToken,
    pub shipping: ShippingInfo,
}

// =============================================================================
// Controller
// =============================================================================

/// Checkout controller for one signed-in shopper.
pub struct CheckoutController {
    identity: UserIdentity,
    default_country: String,
    tax_rate: TaxRate,
    cart: Arc<CartStore>,
    active: Mutex<ActiveSession>,
}

impl CheckoutController {
    /// Starts checkout for `identity`.
    ///
    /// ## Errors
    /// [`CheckoutError::NotAuthenticated`] if the identity has no user id.
    pub fn begin(
        identity: UserIdentity,
        cart: Arc<CartStore>,
        default_country: impl Into<String>,
        tax_rate: TaxRate,
    ) -> CheckoutResult<Self> {
        if !identity.is_authenticated() {
            debug!("Checkout refused for anonymous shopper");
            return Err(CheckoutError::NotAuthenticated);
        }

        let default_country = default_country.into();
        let active = ActiveSession::start(&identity, &default_country);
        info!(user_id = %identity.id, session_id = %active.id, "Checkout started");

        Ok(CheckoutController {
            identity,
            default_country,
            tax_rate,
            cart,
            active: Mutex::new(active),
        })
    }

    fn active(&self) -> MutexGuard<'_, ActiveSession> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Id of the current session. Changes on every reset.
    pub fn session_id(&self) -> Uuid {
        self.active().id
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    pub fn step(&self) -> CheckoutStep {
        self.active().session.step()
    }

    /// Owned copy of the session for rendering.
    pub fn session(&self) -> CheckoutSession {
        self.active().session.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.active().session.is_submitting()
    }

    /// Token cancelled when the current session is torn down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.active().token.clone()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    /// Order summary for the sidebar (free shipping, tax on subtotal).
    pub async fn summary(&self) -> OrderSummary {
        self.cart.summary(self.tax_rate).await
    }

    /// Whether the guard for leaving the current step holds.
    pub fn can_advance(&self) -> bool {
        self.active().session.can_advance()
    }

    /// Required shipping fields that are still empty.
    pub fn shipping_errors(&self) -> Vec<ValidationError> {
        shipping_errors(self.active().session.shipping_info())
    }

    /// Payment fields blocking the payment step.
    pub fn payment_errors(&self) -> Vec<ValidationError> {
        payment_errors(self.active().session.payment_info())
    }

    // =========================================================================
    // Form Edits
    // =========================================================================

    pub fn set_shipping_field(&self, field: ShippingField, value: &str) -> CheckoutResult<()> {
        self.active().session.set_shipping_field(field, value)?;
        Ok(())
    }

    /// Form handler keyed by the input's name (`"zipCode"`).
    pub fn set_shipping_field_by_name(&self, name: &str, value: &str) -> CheckoutResult<()> {
        let field = name.parse::<ShippingField>().map_err(CoreError::from)?;
        self.set_shipping_field(field, value)
    }

    /// Updates a payment field. Card number and expiry are formatted.
    pub fn set_payment_field(&self, field: PaymentField, value: &str) -> CheckoutResult<()> {
        self.active().session.set_payment_field(field, value)?;
        Ok(())
    }

    /// Form handler keyed by the input's name (`"cardNumber"`).
    pub fn set_payment_field_by_name(&self, name: &str, value: &str) -> CheckoutResult<()> {
        let field = name.parse::<PaymentField>().map_err(CoreError::from)?;
        self.set_payment_field(field, value)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Advances if the current guard holds; otherwise stays put.
    ///
    /// Returns the step after the call.
    pub fn next_step(&self) -> CheckoutStep {
        self.navigate("next", CheckoutSession::next_step)
    }

    pub fn prev_step(&self) -> CheckoutStep {
        self.navigate("back", CheckoutSession::prev_step)
    }

    /// From review, jump to the shipping form.
    pub fn edit_shipping(&self) -> CheckoutStep {
        self.navigate("edit shipping", CheckoutSession::edit_shipping)
    }

    /// From review, jump to the payment form.
    pub fn edit_payment(&self) -> CheckoutStep {
        self.navigate("edit payment", CheckoutSession::edit_payment)
    }

    /// From failed, return to review.
    pub fn retry(&self) -> CheckoutStep {
        self.navigate("retry", CheckoutSession::retry)
    }

    fn navigate(&self, action: &'static str, apply: fn(&mut CheckoutSession) -> bool) -> CheckoutStep {
        let mut active = self.active();
        let from = active.session.step();

        if apply(&mut active.session) {
            let to = active.session.step();
            info!(session_id = %active.id, %from, %to, action, "Checkout step changed");
            to
        } else {
            debug!(session_id = %active.id, step = %from, action, "Checkout step unchanged");
            from
        }
    }

    /// Tears down the session and starts a fresh one at shipping.
    ///
    /// Any in-flight submission is cancelled; its late result is discarded.
    /// The email is pre-filled again from the identity.
    pub fn reset(&self) {
        let mut active = self.active();
        active.token.cancel();

        let previous = active.id;
        *active = ActiveSession::start(&self.identity, &self.default_country);
        info!(previous = %previous, session_id = %active.id, "Checkout session reset");
    }

    /// The shopper left checkout. Same teardown as [`CheckoutController::reset`].
    pub fn abandon(&self) {
        debug!("Checkout abandoned");
        self.reset();
    }

    // =========================================================================
    // Submission (driven by OrderSubmitter)
    // =========================================================================

    /// Atomically takes the single-flight lock and enters Submitting.
    pub(crate) fn begin_submission(&self, cart_is_empty: bool) -> SubmitResult<SubmissionTicket> {
        let mut active = self.active();
        active.session.begin_submission(cart_is_empty)?;

        info!(session_id = %active.id, "Order submission started");
        Ok(SubmissionTicket {
            session_id: active.id,
            token: active.token.clone(),
            shipping: active.session.shipping_info().clone(),
        })
    }

    /// Records a submission outcome and releases the lock.
    ///
    /// Returns `false` if `session_id` is no longer the current session; the
    /// outcome is then ignored.
    pub(crate) fn complete_submission(&self, session_id: Uuid, succeeded: bool) -> bool {
        let mut active = self.active();
        if active.id != session_id {
            debug!(stale = %session_id, current = %active.id, "Ignoring outcome for replaced session");
            return false;
        }

        let applied = active.session.finish_submission(succeeded);
        if applied {
            info!(session_id = %session_id, step = %active.session.step(), "Order submission settled");
        }
        applied
    }
}

impl std::fmt::Debug for CheckoutController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutController")
            .field("user_id", &self.identity.id)
            .field("session_id", &self.session_id())
            .field("step", &self.step())
            .finish_non_exhaustive()
    }
}
