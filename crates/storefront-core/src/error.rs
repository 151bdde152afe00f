//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Cart and checkout rule violations              │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── StoreError       - Persistence failures (always recovered)        │
//! │                                                                         │
//! │  storefront-checkout errors                                            │
//! │  ├── CheckoutError    - Session access / editing failures              │
//! │  └── SubmitError      - What the UI shell sees after "Place Order"     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed step guard is NOT an error: `next_step` simply leaves the step
//! unchanged. `ValidationError` values only appear when a caller asks which
//! fields are blocking a step.

use thiserror::Error;

use crate::checkout::CheckoutStep;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The checkout session does not accept edits in its current step.
    ///
    /// ## When This Occurs
    /// - Editing a form field while the order is being submitted
    /// - Editing a form field after the order was placed
    #[error("Checkout session is locked while {step}")]
    SessionLocked { step: CheckoutStep },

    /// A submission is already in flight for this session.
    #[error("An order submission is already in progress")]
    AlreadySubmitting,

    /// The requested operation is not valid from the current step.
    #[error("Cannot {operation} while checkout is at {step}")]
    InvalidStep {
        step: CheckoutStep,
        operation: &'static str,
    },

    /// An order cannot be placed for an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced by the per-field diagnostics in [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value does not have the exact expected length.
    #[error("{field} must be exactly {expected} characters")]
    WrongLength { field: String, expected: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is negative, or would push a quantity or total past what
    /// the cart can represent.
    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    /// Invalid format (e.g., unknown form field name).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::WrongLength { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
