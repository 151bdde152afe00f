//! # Domain Types
//!
//! Core domain types used throughout the storefront cart and checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ShippingInfo   │   │  PaymentInfo    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  name, address  │   │  card_name      │       │
//! │  │  name           │   │  city, state    │   │  card_number    │       │
//! │  │  price_cents    │   │  zip, country   │   │  expiry_date    │       │
//! │  │  stock_quantity │   │  email, phone   │   │  cvv            │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │   CartTotals    │   │  OrderSummary   │       │
//! │  │  bps (u32)      │   │  total_items    │   │  subtotal, tax  │       │
//! │  │  1000 = 10%     │   │  total_price    │   │  shipping, total│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Product` is owned by the external catalog; the core only ever receives
//! already-resolved values and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::DEFAULT_COUNTRY;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1000 bps = 10%.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, as resolved by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Long-form description.
    pub description: String,

    /// Price in cents (smallest currency unit). Never negative.
    pub price_cents: i64,

    /// Reference to the product image (URL or asset key).
    pub image_ref: String,

    /// Catalog category.
    pub category: String,

    /// Units in stock.
    pub stock_quantity: u32,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Shipping Info
// =============================================================================

/// Shipping details captured in the first checkout step.
///
/// Every field is required except `country`, which starts at a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl ShippingInfo {
    /// Creates empty shipping info with the given default country.
    pub fn with_country(country: impl Into<String>) -> Self {
        ShippingInfo {
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: country.into(),
            email: String::new(),
            phone: String::new(),
        }
    }

    /// Returns the value of a single field.
    pub fn get(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::FirstName => &self.first_name,
            ShippingField::LastName => &self.last_name,
            ShippingField::Address => &self.address,
            ShippingField::City => &self.city,
            ShippingField::State => &self.state,
            ShippingField::ZipCode => &self.zip_code,
            ShippingField::Country => &self.country,
            ShippingField::Email => &self.email,
            ShippingField::Phone => &self.phone,
        }
    }

    /// Overwrites a single field.
    pub fn set(&mut self, field: ShippingField, value: impl Into<String>) {
        let slot = match field {
            ShippingField::FirstName => &mut self.first_name,
            ShippingField::LastName => &mut self.last_name,
            ShippingField::Address => &mut self.address,
            ShippingField::City => &mut self.city,
            ShippingField::State => &mut self.state,
            ShippingField::ZipCode => &mut self.zip_code,
            ShippingField::Country => &mut self.country,
            ShippingField::Email => &mut self.email,
            ShippingField::Phone => &mut self.phone,
        };
        *slot = value.into();
    }
}

impl Default for ShippingInfo {
    fn default() -> Self {
        ShippingInfo::with_country(DEFAULT_COUNTRY)
    }
}

/// A single field of [`ShippingInfo`].
///
/// Parses from the camelCase names a form posts (`"firstName"`, `"zipCode"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ShippingField {
    FirstName,
    LastName,
    Address,
    City,
    State,
    ZipCode,
    Country,
    Email,
    Phone,
}

impl ShippingField {
    /// Fields that must be non-empty before leaving the shipping step.
    pub const REQUIRED: [ShippingField; 8] = [
        ShippingField::FirstName,
        ShippingField::LastName,
        ShippingField::Address,
        ShippingField::City,
        ShippingField::State,
        ShippingField::ZipCode,
        ShippingField::Email,
        ShippingField::Phone,
    ];

    /// Returns the form name of the field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShippingField::FirstName => "firstName",
            ShippingField::LastName => "lastName",
            ShippingField::Address => "address",
            ShippingField::City => "city",
            ShippingField::State => "state",
            ShippingField::ZipCode => "zipCode",
            ShippingField::Country => "country",
            ShippingField::Email => "email",
            ShippingField::Phone => "phone",
        }
    }
}

impl fmt::Display for ShippingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "firstName" => Ok(ShippingField::FirstName),
            "lastName" => Ok(ShippingField::LastName),
            "address" => Ok(ShippingField::Address),
            "city" => Ok(ShippingField::City),
            "state" => Ok(ShippingField::State),
            "zipCode" => Ok(ShippingField::ZipCode),
            "country" => Ok(ShippingField::Country),
            "email" => Ok(ShippingField::Email),
            "phone" => Ok(ShippingField::Phone),
            other => Err(ValidationError::InvalidFormat {
                field: other.to_string(),
                reason: "not a shipping field".to_string(),
            }),
        }
    }
}

// =============================================================================
// Payment Info
// =============================================================================

/// Card details captured in the second checkout step.
///
/// `card_number` and `expiry_date` are always stored in canonical form
/// (`"4242 4242 4242 4242"`, `"12/25"`); the session runs every edit through
/// [`crate::validation::format_card_number`] and
/// [`crate::validation::format_expiry_date`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub card_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl PaymentInfo {
    /// Returns the value of a single field.
    pub fn get(&self, field: PaymentField) -> &str {
        match field {
            PaymentField::CardName => &self.card_name,
            PaymentField::CardNumber => &self.card_number,
            PaymentField::ExpiryDate => &self.expiry_date,
            PaymentField::Cvv => &self.cvv,
        }
    }

    /// Returns the last four digits of the card number, for review display.
    pub fn last_four(&self) -> Option<&str> {
        let digits = self.card_number.len();
        if digits < 4 {
            return None;
        }
        self.card_number.get(digits - 4..)
    }
}

/// A single field of [`PaymentInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    CardName,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl PaymentField {
    /// Returns the form name of the field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentField::CardName => "cardName",
            PaymentField::CardNumber => "cardNumber",
            PaymentField::ExpiryDate => "expiryDate",
            PaymentField::Cvv => "cvv",
        }
    }
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardName" => Ok(PaymentField::CardName),
            "cardNumber" => Ok(PaymentField::CardNumber),
            "expiryDate" => Ok(PaymentField::ExpiryDate),
            "cvv" => Ok(PaymentField::Cvv),
            other => Err(ValidationError::InvalidFormat {
                field: other.to_string(),
                reason: "not a payment field".to_string(),
            }),
        }
    }
}

// =============================================================================
// Identity & Orders
// =============================================================================

/// The authenticated user handed over by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
}

impl UserIdentity {
    /// An identity is usable for checkout only when its id is non-empty.
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Identifier assigned to a placed order by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals as exposed to the UI shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of all item quantities.
    pub total_items: i64,
    /// Sum of unit price × quantity over all items.
    pub total_price: Money,
}

/// Order summary shown next to every checkout step.
///
/// Shipping is free on all orders; tax is charged on the subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderSummary {
    /// Builds the summary for a subtotal at the given tax rate.
    pub fn from_subtotal(subtotal: Money, tax_rate: TaxRate) -> Self {
        let shipping = Money::zero();
        let tax = subtotal.calculate_tax(tax_rate);
        OrderSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
