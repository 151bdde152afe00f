//! # Checkout State Machine
//!
//! The checkout session: which step the shopper is on, what they have typed
//! so far, and whether an order submission holds the session.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Steps                                       │
//! │                                                                         │
//! │   ┌──────────┐ Advance ┌──────────┐ Advance ┌──────────┐               │
//! │   │ Shipping │────────►│ Payment  │────────►│  Review  │               │
//! │   │          │◄────────│          │◄────────│          │               │
//! │   └──────────┘  Back   └──────────┘  Back   └────┬─────┘               │
//! │        ▲                     ▲                   │ BeginSubmit         │
//! │        └──── EditShipping ───┴─ EditPayment ─────┤                     │
//! │                                                  ▼                     │
//! │                                           ┌────────────┐               │
//! │                                Retry ┌────│ Submitting │               │
//! │                  (Failed → Review)   │    └─────┬──────┘               │
//! │                                      │          │                      │
//! │                               ┌──────┴─┐   ┌────┴──────┐               │
//! │                               │ Failed │   │ Succeeded │ (terminal)    │
//! │                               └────────┘   └───────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`transition`] is the bare table. Guards (form completeness, non-empty
//! cart, the single-flight lock) are applied by [`CheckoutSession`].

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{PaymentField, PaymentInfo, ShippingField, ShippingInfo};
use crate::validation::{
    format_card_number, format_expiry_date, is_payment_complete, is_shipping_complete,
    payment_errors, shipping_errors,
};

// =============================================================================
// Steps & Transitions
// =============================================================================

/// A step of the checkout flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Capturing the shipping address (session start).
    #[default]
    Shipping,
    /// Capturing card details.
    Payment,
    /// Read-only review before placing the order.
    Review,
    /// The order service call is in flight.
    Submitting,
    /// The order was placed.
    Succeeded,
    /// The order service rejected or failed the order.
    Failed,
}

impl CheckoutStep {
    /// Returns true once the order has been placed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Succeeded)
    }

    /// Returns true if form fields may be edited in this step.
    pub fn accepts_edits(&self) -> bool {
        !matches!(self, CheckoutStep::Submitting | CheckoutStep::Succeeded)
    }

    /// Position in the three-step progress indicator (1-based).
    pub fn progress_index(&self) -> u8 {
        match self {
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::Submitting => "submitting",
            CheckoutStep::Succeeded => "succeeded",
            CheckoutStep::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// An event that can move the session between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance,
    Back,
    EditShipping,
    EditPayment,
    BeginSubmit,
    SubmitSucceeded,
    SubmitFailed,
    Retry,
}

/// The unguarded transition table.
///
/// Returns the target step, or `None` if the event is not valid from `from`.
pub fn transition(from: CheckoutStep, event: Transition) -> Option<CheckoutStep> {
    use CheckoutStep::*;
    use Transition::*;

    match (from, event) {
        (Shipping, Advance) => Some(Payment),
        (Payment, Advance) => Some(Review),
        (Payment, Back) => Some(Shipping),
        (Review, Back) => Some(Payment),
        (Review, EditShipping) => Some(Shipping),
        (Review, EditPayment) => Some(Payment),
        (Review, BeginSubmit) => Some(Submitting),
        (Submitting, SubmitSucceeded) => Some(Succeeded),
        (Submitting, SubmitFailed) => Some(Failed),
        (Failed, Retry) => Some(Review),
        _ => None,
    }
}

// =============================================================================
// Checkout Session
// =============================================================================

/// Per-attempt checkout state.
///
/// ## Invariants
/// - `submission_lock` is true exactly while `step == Submitting`
/// - Moving between steps never clears form data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    step: CheckoutStep,
    shipping_info: ShippingInfo,
    payment_info: PaymentInfo,
    submission_lock: bool,
}

impl CheckoutSession {
    /// Starts a session at the shipping step.
    ///
    /// `email` pre-fills the shipping email when the shopper is signed in.
    pub fn new(default_country: &str, email: Option<&str>) -> Self {
        let mut shipping_info = ShippingInfo::with_country(default_country);
        if let Some(email) = email {
            shipping_info.email = email.to_string();
        }

        CheckoutSession {
            step: CheckoutStep::Shipping,
            shipping_info,
            payment_info: PaymentInfo::default(),
            submission_lock: false,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn shipping_info(&self) -> &ShippingInfo {
        &self.shipping_info
    }

    pub fn payment_info(&self) -> &PaymentInfo {
        &self.payment_info
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_lock
    }

    // -------------------------------------------------------------------------
    // Field edits
    // -------------------------------------------------------------------------

    /// Updates one shipping field.
    pub fn set_shipping_field(&mut self, field: ShippingField, value: &str) -> CoreResult<()> {
        self.ensure_editable()?;
        self.shipping_info.set(field, value);
        Ok(())
    }

    /// Updates one payment field.
    ///
    /// Card number and expiry date are canonicalized on every edit.
    pub fn set_payment_field(&mut self, field: PaymentField, value: &str) -> CoreResult<()> {
        self.ensure_editable()?;

        let info = &mut self.payment_info;
        match field {
            PaymentField::CardName => info.card_name = value.to_string(),
            PaymentField::CardNumber => info.card_number = format_card_number(value),
            PaymentField::ExpiryDate => info.expiry_date = format_expiry_date(value),
            PaymentField::Cvv => info.cvv = value.to_string(),
        }
        Ok(())
    }

    fn ensure_editable(&self) -> CoreResult<()> {
        if self.step.accepts_edits() {
            Ok(())
        } else {
            Err(CoreError::SessionLocked { step: self.step })
        }
    }

    // -------------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------------

    /// Returns true if the guard for leaving the current step holds.
    ///
    /// Review has no form guard; its cart guard is checked at submission.
    pub fn can_advance(&self) -> bool {
        match self.step {
            CheckoutStep::Shipping => is_shipping_complete(&self.shipping_info),
            CheckoutStep::Payment => is_payment_complete(&self.payment_info),
            _ => false,
        }
    }

    /// Lists the fields blocking the current step.
    pub fn blocking_errors(&self) -> Vec<ValidationError> {
        match self.step {
            CheckoutStep::Shipping => shipping_errors(&self.shipping_info),
            CheckoutStep::Payment => payment_errors(&self.payment_info),
            _ => Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Moves forward one step if the current guard holds.
    ///
    /// A failed guard leaves the step unchanged. Returns `true` if the step
    /// changed.
    pub fn next_step(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.apply(Transition::Advance)
    }

    /// Moves back one step (Payment → Shipping, Review → Payment).
    pub fn prev_step(&mut self) -> bool {
        self.apply(Transition::Back)
    }

    /// Jumps from Review straight to the shipping form.
    pub fn edit_shipping(&mut self) -> bool {
        self.apply(Transition::EditShipping)
    }

    /// Jumps from Review straight to the payment form.
    pub fn edit_payment(&mut self) -> bool {
        self.apply(Transition::EditPayment)
    }

    /// Returns from Failed to Review so the shopper can try again.
    pub fn retry(&mut self) -> bool {
        self.apply(Transition::Retry)
    }

    fn apply(&mut self, event: Transition) -> bool {
        match transition(self.step, event) {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Takes the single-flight lock and enters Submitting.
    ///
    /// ## Errors
    /// - [`CoreError::AlreadySubmitting`] if the lock is held
    /// - [`CoreError::InvalidStep`] if the session is not at Review
    /// - [`CoreError::EmptyCart`] if there is nothing to order
    ///
    /// On error the session is untouched.
    pub fn begin_submission(&mut self, cart_is_empty: bool) -> CoreResult<()> {
        if self.submission_lock {
            return Err(CoreError::AlreadySubmitting);
        }

        if self.step != CheckoutStep::Review {
            return Err(CoreError::InvalidStep {
                step: self.step,
                operation: "submit",
            });
        }

        if cart_is_empty {
            return Err(CoreError::EmptyCart);
        }

        self.submission_lock = true;
        self.apply(Transition::BeginSubmit);
        Ok(())
    }

    /// Records the outcome of a submission and releases the lock.
    ///
    /// Ignored when no submission is in flight.
    pub fn finish_submission(&mut self, succeeded: bool) -> bool {
        if !self.submission_lock {
            return false;
        }

        self.submission_lock = false;
        let event = if succeeded {
            Transition::SubmitSucceeded
        } else {
            Transition::SubmitFailed
        };
        self.apply(event)
    }
}
