//! # Cart Repository
//!
//! Persists the cart as a JSON array of cart items under a single key.
//!
//! ## Stored Format
//! ```text
//! key:   "cart"
//! value: [{"productId":"mug","name":"Mug","unitPriceCents":1250,
//!          "quantity":2,"addedAt":"2026-01-01T00:00:00Z",...}, ...]
//! ```
//!
//! Reads repair the invariants a hand-edited or older value may break:
//! quantities below 1 are dropped and duplicate product ids are merged.
//! Values that cannot be repaired (negative prices, totals past i64) are
//! reported as malformed.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use storefront_core::cart::{Cart, CartItem};

use crate::error::{StoreError, StoreResult};
use crate::repository::kv::KeyValueStore;

/// Load/save capability for the cart.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Reads the stored cart. A missing entry yields an empty cart.
    ///
    /// ## Errors
    /// [`StoreError::Malformed`] when the stored value cannot be decoded.
    async fn load(&self) -> StoreResult<Cart>;

    /// Replaces the stored cart.
    async fn save(&self, cart: &Cart) -> StoreResult<()>;
}

/// [`CartRepository`] over any [`KeyValueStore`].
#[derive(Clone)]
pub struct KvCartRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvCartRepository {
    /// Creates a repository storing the cart under `key`.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        KvCartRepository {
            store,
            key: key.into(),
        }
    }

    /// The key the cart is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for KvCartRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvCartRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CartRepository for KvCartRepository {
    async fn load(&self) -> StoreResult<Cart> {
        let Some(raw) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "No stored cart");
            return Ok(Cart::new());
        };

        let items: Vec<CartItem> =
            serde_json::from_str(&raw).map_err(|e| StoreError::malformed(&self.key, e))?;

        let (cart, repaired) =
            Cart::from_items(items).map_err(|e| StoreError::malformed(&self.key, e))?;
        if repaired > 0 {
            warn!(key = %self.key, repaired, "Repaired stored cart entries");
        }

        debug!(key = %self.key, items = cart.len(), "Loaded cart");
        Ok(cart)
    }

    async fn save(&self, cart: &Cart) -> StoreResult<()> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(&self.key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::kv::MemoryKvStore;
    use chrono::Utc;
    use storefront_core::types::Product;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: String::new(),
            price_cents,
            image_ref: format!("/img/{}.png", id),
            category: "Outdoor".to_string(),
            stock_quantity: 3,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty_cart() {
        let repo = KvCartRepository::new(Arc::new(MemoryKvStore::new()), "cart");
        let cart = repo.load().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.carts("cart");

        let mut cart = Cart::new();
        cart.add_item(&product("tent", 15000), 1).unwrap();
        cart.add_item(&product("lamp", 2500), 3).unwrap();
        repo.save(&cart).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, cart);
        assert_eq!(loaded.totals(), cart.totals());

        // A second repository over the same pool sees the same data
        let again = db.carts("cart").load().await.unwrap();
        assert_eq!(again.len(), 2);
    }

    #[tokio::test]
    async fn test_stored_json_is_an_array_of_items() {
        let store = Arc::new(MemoryKvStore::new());
        let repo = KvCartRepository::new(store.clone(), "cart");

        let mut cart = Cart::new();
        cart.add_item(&product("tent", 15000), 2).unwrap();
        repo.save(&cart).await.unwrap();

        let raw = store.get("cart").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["productId"], "tent");
        assert_eq!(items[0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_malformed_value_is_an_error() {
        let store = MemoryKvStore::with_entry("cart", "{not json");
        let repo = KvCartRepository::new(Arc::new(store), "cart");

        let err = repo.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { ref key, .. } if key == "cart"));
    }

    #[tokio::test]
    async fn test_load_repairs_invariants() {
        let raw = r#"[
            {"productId":"a","name":"A","unitPriceCents":100,"quantity":2,"addedAt":"2026-01-01T00:00:00Z"},
            {"productId":"b","name":"B","unitPriceCents":50,"quantity":0,"addedAt":"2026-01-01T00:00:00Z"},
            {"productId":"a","name":"A","unitPriceCents":100,"quantity":3,"addedAt":"2026-01-02T00:00:00Z"}
        ]"#;
        let repo = KvCartRepository::new(Arc::new(MemoryKvStore::with_entry("cart", raw)), "cart");

        let cart = repo.load().await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(5));
        assert_eq!(cart.total_price().cents(), 500);
    }

    #[tokio::test]
    async fn test_unrepairable_values_are_malformed() {
        let overflowing_merge = r#"[
            {"productId":"a","name":"A","unitPriceCents":1,"quantity":9223372036854775807,"addedAt":"2026-01-01T00:00:00Z"},
            {"productId":"a","name":"A","unitPriceCents":1,"quantity":1,"addedAt":"2026-01-01T00:00:00Z"}
        ]"#;
        let overflowing_line = r#"[
            {"productId":"a","name":"A","unitPriceCents":100,"quantity":100000000000000000,"addedAt":"2026-01-01T00:00:00Z"}
        ]"#;
        let negative_price = r#"[
            {"productId":"a","name":"A","unitPriceCents":-100,"quantity":1,"addedAt":"2026-01-01T00:00:00Z"}
        ]"#;

        for raw in [overflowing_merge, overflowing_line, negative_price] {
            let repo = KvCartRepository::new(Arc::new(MemoryKvStore::with_entry("cart", raw)), "cart");
            let err = repo.load().await.unwrap_err();
            assert!(matches!(err, StoreError::Malformed { ref key, .. } if key == "cart"));
        }
    }

    #[tokio::test]
    async fn test_custom_key() {
        let store = Arc::new(MemoryKvStore::new());
        let repo = KvCartRepository::new(store.clone(), "guest-cart");
        repo.save(&Cart::new()).await.unwrap();

        assert_eq!(repo.key(), "guest-cart");
        assert_eq!(store.get("guest-cart").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("cart").await.unwrap(), None);
    }
}
