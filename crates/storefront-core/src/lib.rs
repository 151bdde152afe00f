//! # storefront-core: Pure Cart & Checkout Logic
//!
//! This crate holds the storefront's cart and checkout rules as pure
//! functions and plain data. It never touches storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Checkout Core                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI Shell (pages, forms)                      │   │
//! │  │    Product page ──► Cart page ──► Checkout ──► Account          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-checkout (services)                  │   │
//! │  │    CartStore, CheckoutController, OrderSubmitter               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │   cart   │ │ checkout (FSM)   │  │   │
//! │  │   │ Product  │ │  Money   │ │   Cart   │ │ CheckoutSession  │  │   │
//! │  │   │ Shipping │ │ TaxRate  │ │ CartItem │ │ validation       │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-db (key-value persistence)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ShippingInfo, PaymentInfo, etc.)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart and CartItem with the totals invariant
//! - [`checkout`] - Checkout steps, transition table and session
//! - [`validation`] - Formatters and step guards
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::Cart;
//! use storefront_core::types::{Product, TaxRate};
//! use storefront_core::DEFAULT_TAX_RATE_BPS;
//!
//! let product = Product {
//!     id: "mug".to_string(),
//!     name: "Mug".to_string(),
//!     description: String::new(),
//!     price_cents: 1250,
//!     image_ref: String::new(),
//!     category: "Kitchen".to_string(),
//!     stock_quantity: 5,
//!     created_at: chrono::Utc::now(),
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&product, 2).unwrap();
//!
//! let summary = cart.summary(TaxRate::from_bps(DEFAULT_TAX_RATE_BPS));
//! assert_eq!(summary.subtotal.cents(), 2500);
//! assert_eq!(summary.total.cents(), 2750);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use checkout::{CheckoutSession, CheckoutStep, Transition};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Country pre-selected on the shipping form.
pub const DEFAULT_COUNTRY: &str = "US";

/// Countries offered by the shipping form.
pub const SUPPORTED_COUNTRIES: [&str; 4] = ["US", "CA", "UK", "AU"];

/// Sales tax applied to the cart subtotal (10%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;

/// Key under which the cart is persisted in the key-value store.
pub const CART_STORAGE_KEY: &str = "cart";
