//! # Cart Model
//!
//! The in-memory shopping cart and its line items.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  User Action              Cart Method             Effect                │
//! │  ───────────              ───────────             ──────                │
//! │                                                                         │
//! │  Add to cart ────────────► add_item() ──────────► qty += n or push     │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► qty = n (n < 1 ⇒ rm) │
//! │                                                                         │
//! │  Remove ─────────────────► remove_item() ───────► retain(id != x)      │
//! │                                                                         │
//! │  Clear / order placed ───► clear() ─────────────► items.clear()        │
//! │                                                                         │
//! │  View cart ──────────────► totals() ────────────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This type does no I/O. Persisting after every mutation is the job of the
//! `CartStore` service in `storefront-checkout`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartTotals, OrderSummary, Product, TaxRate};
use crate::validation::{validate_price, validate_quantity};

/// An item in the shopping cart.
///
/// ## Design Notes
/// Display and pricing fields are a frozen copy of the product at the time it
/// was added. If the catalog price changes afterwards, this item keeps the
/// original price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID (unique within a cart)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Description at time of adding (frozen)
    #[serde(default)]
    pub description: String,

    /// Price in cents at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Image reference at time of adding (frozen)
    #[serde(default)]
    pub image_ref: String,

    /// Category at time of adding (frozen)
    #[serde(default)]
    pub category: String,

    /// Quantity in cart, always >= 1
    pub quantity: i64,

    /// When this item was first added to the cart
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart item from a product and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            unit_price_cents: product.price_cents,
            image_ref: product.image_ref.clone(),
            category: product.category.clone(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns the frozen unit price.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product increases quantity)
/// - Every quantity is >= 1 (setting a quantity below 1 removes the item)
/// - Items iterate in the order they were first added
/// - `total_items` and `total_price` fit in an i64; a mutation that would
///   overflow either is rejected
///
/// Serializes as a bare item array. There is no `Deserialize`: stored items
/// come back through [`Cart::from_items`], which re-checks the invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Rebuilds a cart from stored items, repairing broken invariants.
    ///
    /// Items with quantity < 1 are dropped and duplicate product ids are
    /// merged into the first occurrence. Returns the cart together with the
    /// number of stored entries that had to be dropped or merged.
    ///
    /// ## Errors
    /// A negative price, or quantities and prices whose totals overflow,
    /// cannot be repaired and reject the whole list.
    pub fn from_items(items: Vec<CartItem>) -> CoreResult<(Self, usize)> {
        let stored = items.len();
        let mut cart = Cart::new();

        for item in items.into_iter().filter(|i| i.quantity >= 1) {
            validate_price(item.unit_price_cents)?;

            match cart.items.iter().position(|i| i.product_id == item.product_id) {
                Some(index) => {
                    let existing = &cart.items[index];
                    let quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or_else(|| out_of_range("quantity too large"))?;
                    cart.ensure_totals_fit(&existing.product_id, existing.unit_price_cents, quantity)?;
                    cart.items[index].quantity = quantity;
                }
                None => {
                    cart.ensure_totals_fit(&item.product_id, item.unit_price_cents, item.quantity)?;
                    cart.items.push(item);
                }
            }
        }

        let repaired = stored - cart.items.len();
        Ok((cart, repaired))
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity increases by `quantity`
    /// - Product not in cart: a new snapshot item is appended
    ///
    /// ## Errors
    /// The cart is left unchanged when:
    /// - `quantity < 1`
    /// - the product's price is negative
    /// - the new quantity or the cart totals would overflow
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_price(product.price_cents)?;

        let (unit_price_cents, new_quantity) = match self.get(&product.id) {
            Some(item) => (
                item.unit_price_cents,
                item.quantity
                    .checked_add(quantity)
                    .ok_or_else(|| out_of_range("quantity too large"))?,
            ),
            None => (product.price_cents, quantity),
        };
        self.ensure_totals_fit(&product.id, unit_price_cents, new_quantity)?;

        if let Some(item) = self.find_mut(&product.id) {
            item.quantity = new_quantity;
            return Ok(());
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of an item.
    ///
    /// A quantity below 1 removes the item. Unknown ids are ignored.
    /// Returns `true` if the cart changed.
    ///
    /// ## Errors
    /// A quantity whose line or cart total would overflow is rejected and
    /// the cart is left unchanged.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<bool> {
        if quantity < 1 {
            return Ok(self.remove_item(product_id));
        }

        let unit_price_cents = match self.get(product_id) {
            Some(item) if item.quantity != quantity => item.unit_price_cents,
            _ => return Ok(false),
        };
        self.ensure_totals_fit(product_id, unit_price_cents, quantity)?;

        if let Some(item) = self.find_mut(product_id) {
            item.quantity = quantity;
        }
        Ok(true)
    }

    /// Removes an item by product ID. Returns `true` if an item was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != initial_len
    }

    /// Clears all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up the item for a product.
    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Returns the number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all items.
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.quantity))
    }

    /// Returns the sum of all line totals.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Returns both totals at once.
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.total_items(),
            total_price: self.total_price(),
        }
    }

    /// Builds the order summary (free shipping, tax on the subtotal).
    pub fn summary(&self, tax_rate: TaxRate) -> OrderSummary {
        OrderSummary::from_subtotal(self.total_price(), tax_rate)
    }

    fn find_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }

    /// Checks that the totals still fit once `product_id`'s line holds
    /// `quantity` units at `unit_price_cents`.
    fn ensure_totals_fit(&self, product_id: &str, unit_price_cents: i64, quantity: i64) -> CoreResult<()> {
        let line = Money::from_cents(unit_price_cents)
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| out_of_range("line total too large"))?;

        self.items
            .iter()
            .filter(|i| i.product_id != product_id)
            .try_fold((quantity, line), |(count, price), item| {
                let item_line = item.unit_price().checked_multiply_quantity(item.quantity)?;
                Some((count.checked_add(item.quantity)?, price.checked_add(item_line)?))
            })
            .map(|_| ())
            .ok_or_else(|| out_of_range("cart total too large"))
    }
}

fn out_of_range(reason: &str) -> CoreError {
    CoreError::Validation(ValidationError::OutOfRange {
        field: "quantity".to_string(),
        reason: reason.to_string(),
    })
}
