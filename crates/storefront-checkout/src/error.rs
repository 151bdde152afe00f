//! # Checkout Error Types
//!
//! Error types surfaced by the cart and checkout services.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  CheckoutError  │  │   SubmitError   │  │      ConfigError        │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ NotAuthenticated│  │ NotReady        │  │  Io / Parse             │ │
//! │  │ SessionLocked   │  │ EmptyCart       │  │  Invalid                │ │
//! │  │ Core            │  │ AlreadySubmitting│ │  NoConfigPath           │ │
//! │  └─────────────────┘  │ Rejected        │  └─────────────────────────┘ │
//! │                       │ ServiceFault    │                              │
//! │                       │ Cancelled       │   ┌─────────────────────┐    │
//! │                       │ Invalid         │   │     OrderError      │    │
//! │                       └────────┬────────┘   │                     │    │
//! │                                └───wraps───►│ (order service)     │    │
//! │                                             └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error carries a stable machine-readable `code()` for the UI shell.

use thiserror::Error;

use storefront_core::{CheckoutStep, CoreError, ValidationError};

// =============================================================================
// Checkout Error
// =============================================================================

/// Errors from starting or editing a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requires a signed-in user.
    #[error("Sign in to check out")]
    NotAuthenticated,

    /// Form fields cannot change in the current step.
    #[error("Checkout session is locked while {step}")]
    SessionLocked { step: CheckoutStep },

    /// A rule in storefront-core rejected the operation.
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionLocked { step } => CheckoutError::SessionLocked { step },
            other => CheckoutError::Core(other),
        }
    }
}

impl CheckoutError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::NotAuthenticated => "NOT_AUTHENTICATED",
            CheckoutError::SessionLocked { .. } => "SESSION_LOCKED",
            CheckoutError::Core(CoreError::Validation(_)) => "VALIDATION_ERROR",
            CheckoutError::Core(_) => "INVALID_OPERATION",
        }
    }
}

/// Result type for checkout session operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Order Error
// =============================================================================

/// Failure reported by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The order was refused (payment declined, stock gone, ...).
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// The order service could not be reached or failed internally.
    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Submit Error
// =============================================================================

/// What the shell sees after "Place Order".
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The session is not at the review step.
    #[error("Checkout is at {step}; orders can only be placed from review")]
    NotReady { step: CheckoutStep },

    /// Nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// Another submission holds the session. No order was sent.
    #[error("An order submission is already in progress")]
    AlreadySubmitting,

    /// The order service refused or failed the order. Cart and form data are
    /// kept; the session is at Failed.
    #[error(transparent)]
    Rejected(#[from] OrderError),

    /// The order service faulted (panicked) mid-call. The session is at Failed.
    #[error("Order service fault: {0}")]
    ServiceFault(String),

    /// The session was abandoned before the order completed; any late result
    /// was discarded.
    #[error("Checkout was cancelled")]
    Cancelled,

    /// Session data failed a core rule. No order was sent.
    #[error(transparent)]
    Invalid(ValidationError),
}

impl SubmitError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::NotReady { .. } => "NOT_READY",
            SubmitError::EmptyCart => "EMPTY_CART",
            SubmitError::AlreadySubmitting => "ALREADY_SUBMITTING",
            SubmitError::Rejected(_) => "ORDER_REJECTED",
            SubmitError::ServiceFault(_) => "SERVICE_FAULT",
            SubmitError::Cancelled => "CANCELLED",
            SubmitError::Invalid(_) => "VALIDATION_ERROR",
        }
    }

    /// Whether the shopper can retry from review.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Rejected(_) | SubmitError::ServiceFault(_))
    }
}

/// Maps a refused `begin_submission` onto the submit surface.
impl From<CoreError> for SubmitError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlreadySubmitting => SubmitError::AlreadySubmitting,
            CoreError::EmptyCart => SubmitError::EmptyCart,
            CoreError::InvalidStep { step, .. } | CoreError::SessionLocked { step } => {
                SubmitError::NotReady { step }
            }
            CoreError::Validation(e) => SubmitError::Invalid(e),
        }
    }
}

/// Result type for order submission.
pub type SubmitResult<T> = Result<T, SubmitError>;

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written.
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be rendered to TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A setting is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No platform config directory and no explicit path.
    #[error("No config path available")]
    NoConfigPath,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_locked_maps_to_its_own_variant() {
        let err: CheckoutError = CoreError::SessionLocked {
            step: CheckoutStep::Submitting,
        }
        .into();
        assert!(matches!(err, CheckoutError::SessionLocked { .. }));
        assert_eq!(err.code(), "SESSION_LOCKED");
    }

    #[test]
    fn test_begin_submission_errors_map_to_submit_errors() {
        assert!(matches!(
            SubmitError::from(CoreError::AlreadySubmitting),
            SubmitError::AlreadySubmitting
        ));
        assert!(matches!(
            SubmitError::from(CoreError::EmptyCart),
            SubmitError::EmptyCart
        ));
        let err = SubmitError::from(CoreError::InvalidStep {
            step: CheckoutStep::Payment,
            operation: "submit",
        });
        assert_eq!(err.code(), "NOT_READY");
        assert_eq!(
            err.to_string(),
            "Checkout is at payment; orders can only be placed from review"
        );
    }

    #[test]
    fn test_rejection_is_retryable() {
        let err = SubmitError::from(OrderError::Rejected("card declined".into()));
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Order rejected: card declined");
        assert!(!SubmitError::Cancelled.is_retryable());
        assert!(!SubmitError::AlreadySubmitting.is_retryable());
    }

    #[test]
    fn test_validation_errors_are_not_service_faults() {
        let err = SubmitError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }));
        assert!(matches!(err, SubmitError::Invalid(_)));
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "quantity must be positive");
        assert!(!err.is_retryable());
    }
}
