//! # Cart Store
//!
//! The shopper's cart, shared by every page of the storefront.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add / remove / set_quantity / clear                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock cart (tokio Mutex) ──► mutate Cart ──► repository.save(&cart)    │
//! │                                                  │                      │
//! │                                     error? ──────┴──► warn!, carry on  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unlock, return                                                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart lock is held across the save so writes reach storage in the same
//! order as the mutations. When a mutating call returns, a later `load()`
//! observes it. Storage failures never reach the caller; the in-memory cart
//! stays authoritative.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use storefront_core::{Cart, CartTotals, CoreResult, OrderSummary, Product, TaxRate};
use storefront_db::CartRepository;

/// Cart service. Construct once per process and share by `Arc`.
pub struct CartStore {
    cart: Mutex<Cart>,
    repository: Arc<dyn CartRepository>,
}

impl CartStore {
    /// Creates a store with an empty cart. Call [`CartStore::load`] to
    /// restore the persisted cart.
    pub fn new(repository: Arc<dyn CartRepository>) -> Self {
        CartStore {
            cart: Mutex::new(Cart::new()),
            repository,
        }
    }

    /// Creates a store and restores the persisted cart.
    pub async fn open(repository: Arc<dyn CartRepository>) -> Self {
        let store = CartStore::new(repository);
        store.load().await;
        store
    }

    /// Replaces the in-memory cart with the persisted one.
    ///
    /// Missing or unreadable data yields an empty cart.
    pub async fn load(&self) {
        let mut cart = self.cart.lock().await;

        *cart = match self.repository.load().await {
            Ok(stored) => {
                debug!(items = stored.len(), "Cart restored");
                stored
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore cart, starting empty");
                Cart::new()
            }
        };
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` units of a product.
    ///
    /// ## Errors
    /// A quantity below 1 is rejected and nothing changes.
    pub async fn add(&self, product: &Product, quantity: i64) -> CoreResult<CartTotals> {
        debug!(product_id = %product.id, quantity, "add to cart");

        let mut cart = self.cart.lock().await;
        cart.add_item(product, quantity)?;
        self.persist(&cart).await;

        Ok(cart.totals())
    }

    /// Adds a single unit (the product page's "Add to Cart" button).
    pub async fn add_one(&self, product: &Product) -> CoreResult<CartTotals> {
        self.add(product, 1).await
    }

    /// Removes a product. Returns `true` if it was in the cart.
    pub async fn remove(&self, product_id: &str) -> bool {
        debug!(product_id = %product_id, "remove from cart");

        let mut cart = self.cart.lock().await;
        let removed = cart.remove_item(product_id);
        self.persist(&cart).await;

        removed
    }

    /// Overwrites a product's quantity. Below 1 removes the product.
    ///
    /// Returns `true` if the cart changed.
    ///
    /// ## Errors
    /// A quantity that would overflow the cart totals is rejected and
    /// nothing changes.
    pub async fn set_quantity(&self, product_id: &str, quantity: i64) -> CoreResult<bool> {
        debug!(product_id = %product_id, quantity, "set cart quantity");

        let mut cart = self.cart.lock().await;
        let changed = cart.set_quantity(product_id, quantity)?;
        self.persist(&cart).await;

        Ok(changed)
    }

    /// Empties the cart.
    pub async fn clear(&self) {
        debug!("clear cart");

        let mut cart = self.cart.lock().await;
        cart.clear();
        self.persist(&cart).await;
    }

    async fn persist(&self, cart: &Cart) {
        if let Err(e) = self.repository.save(cart).await {
            warn!(error = %e, items = cart.len(), "Failed to persist cart");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `{ total_items, total_price }`.
    pub async fn totals(&self) -> CartTotals {
        self.cart.lock().await.totals()
    }

    /// Returns an owned copy of the cart.
    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// Returns the order summary at the given tax rate.
    pub async fn summary(&self, tax_rate: TaxRate) -> OrderSummary {
        self.cart.lock().await.summary(tax_rate)
    }

    pub async fn is_empty(&self) -> bool {
        self.cart.lock().await.is_empty()
    }

    /// Number of distinct products.
    pub async fn len(&self) -> usize {
        self.cart.lock().await.len()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storefront_db::{KvCartRepository, MemoryKvStore, StoreError, StoreResult};

    pub(crate) fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: format!("About {}", id),
            price_cents,
            image_ref: format!("/images/{}.jpg", id),
            category: "Apparel".to_string(),
            stock_quantity: 20,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn memory_repository() -> Arc<dyn CartRepository> {
        Arc::new(KvCartRepository::new(Arc::new(MemoryKvStore::new()), "cart"))
    }

    /// Repository whose writes always fail.
    struct BrokenRepository {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl CartRepository for BrokenRepository {
        async fn load(&self) -> StoreResult<Cart> {
            Err(StoreError::malformed("cart", "unexpected end of input"))
        }

        async fn save(&self, _cart: &Cart) -> StoreResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Internal("disk full".to_string()))
        }
    }

    async fn assert_totals_consistent(store: &CartStore) {
        let cart = store.snapshot().await;
        let quantity: i64 = cart.items().iter().map(|i| i.quantity).sum();
        let price: i64 = cart
            .items()
            .iter()
            .map(|i| i.unit_price_cents * i.quantity)
            .sum();
        let totals = store.totals().await;
        assert_eq!(totals.total_items, quantity);
        assert_eq!(totals.total_price.cents(), price);
    }

    #[tokio::test]
    async fn test_add_same_product_merges() {
        let store = CartStore::new(memory_repository());
        let shirt = product("shirt", 2500);

        store.add(&shirt, 2).await.unwrap();
        let totals = store.add(&shirt, 3).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(totals.total_items, 5);
        assert_eq!(totals.total_price.cents(), 12500);

        let totals = store.add_one(&shirt).await.unwrap();
        assert_eq!(totals.total_items, 6);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let store = CartStore::new(memory_repository());
        assert!(store.add(&product("shirt", 2500), 0).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_and_negative_quantity_remove() {
        let store = CartStore::new(memory_repository());
        store.add(&product("a", 100), 1).await.unwrap();
        store.add(&product("b", 200), 1).await.unwrap();

        assert!(store.set_quantity("a", 0).await.unwrap());
        assert!(store.set_quantity("b", -1).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_totals_hold_over_mixed_operations() {
        let store = CartStore::new(memory_repository());
        let a = product("a", 1999);
        let b = product("b", 5);

        store.add(&a, 1).await.unwrap();
        assert_totals_consistent(&store).await;
        store.add(&b, 4).await.unwrap();
        assert_totals_consistent(&store).await;
        store.set_quantity("a", 7).await.unwrap();
        assert_totals_consistent(&store).await;
        store.remove("b").await;
        assert_totals_consistent(&store).await;
        assert!(!store.remove("b").await);
        assert!(!store.set_quantity("missing", 3).await.unwrap());
        assert_totals_consistent(&store).await;

        assert_eq!(store.totals().await.total_items, 7);
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let repository = memory_repository();
        let store = CartStore::new(repository.clone());
        store.add(&product("a", 1000), 2).await.unwrap();
        store.add(&product("b", 300), 1).await.unwrap();
        store.set_quantity("b", 4).await.unwrap();

        let reopened = CartStore::open(repository.clone()).await;
        assert_eq!(reopened.snapshot().await, store.snapshot().await);
        assert_eq!(reopened.totals().await.total_price.cents(), 3200);

        store.clear().await;
        let reopened = CartStore::open(repository).await;
        assert!(reopened.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_empty() {
        let repository = Arc::new(BrokenRepository {
            saves: AtomicUsize::new(0),
        });
        let store = CartStore::open(repository.clone()).await;
        assert!(store.is_empty().await);

        // Writes fail but the in-memory cart still changes
        store.add(&product("a", 100), 1).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(repository.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_stored_cart_starts_empty() {
        let kv = MemoryKvStore::with_entry("cart", "[{\"productId\": 42}]");
        let repository = Arc::new(KvCartRepository::new(Arc::new(kv), "cart"));

        let store = CartStore::open(repository).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_overflowing_stored_cart_starts_empty() {
        let raw = r#"[
            {"productId":"a","name":"A","unitPriceCents":1,"quantity":9223372036854775807,"addedAt":"2026-01-01T00:00:00Z"},
            {"productId":"a","name":"A","unitPriceCents":1,"quantity":1,"addedAt":"2026-01-01T00:00:00Z"}
        ]"#;
        let kv = MemoryKvStore::with_entry("cart", raw);
        let store = CartStore::open(Arc::new(KvCartRepository::new(Arc::new(kv), "cart"))).await;
        assert!(store.is_empty().await);

        let raw = r#"[
            {"productId":"a","name":"A","unitPriceCents":100,"quantity":100000000000000000,"addedAt":"2026-01-01T00:00:00Z"}
        ]"#;
        let kv = MemoryKvStore::with_entry("cart", raw);
        let store = CartStore::open(Arc::new(KvCartRepository::new(Arc::new(kv), "cart"))).await;
        assert_eq!(store.totals().await, CartTotals::default());
    }

    #[tokio::test]
    async fn test_overflowing_mutations_are_rejected() {
        let repository = memory_repository();
        let store = CartStore::new(repository.clone());
        let unit = product("unit", 1);

        store.add(&unit, i64::MAX).await.unwrap();
        assert!(store.add(&unit, i64::MAX).await.is_err());
        assert!(store.set_quantity("unit", 0).await.unwrap());

        store.add(&product("pricey", 100), 1).await.unwrap();
        assert!(store.set_quantity("pricey", i64::MAX).await.is_err());
        assert_totals_consistent(&store).await;

        // The rejected writes never reached storage
        let reopened = CartStore::open(repository).await;
        assert_eq!(reopened.snapshot().await, store.snapshot().await);
        assert_eq!(reopened.totals().await.total_items, 1);
    }

    #[tokio::test]
    async fn test_summary_applies_tax() {
        let store = CartStore::new(memory_repository());
        store.add(&product("a", 2000), 1).await.unwrap();

        let summary = store.summary(TaxRate::from_bps(1000)).await;
        assert_eq!(summary.subtotal.cents(), 2000);
        assert_eq!(summary.tax.cents(), 200);
        assert_eq!(summary.total.cents(), 2200);
    }
}
