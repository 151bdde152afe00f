//! # storefront-checkout: Cart & Checkout Services
//!
//! Stateful services a storefront shell drives: the persisted cart, the
//! checkout session, and single-flight order submission.
//!
//! ## Module Organization
//! ```text
//! storefront_checkout/
//! ├── lib.rs            ◄─── You are here (Storefront composition root)
//! ├── cart_store.rs     ◄─── CartStore: cart + write-through persistence
//! ├── controller.rs     ◄─── CheckoutController: session, forms, navigation
//! ├── submitter.rs      ◄─── OrderSubmitter: single-flight placement
//! ├── order_service.rs  ◄─── OrderService trait + simulated backend
//! ├── events.rs         ◄─── OrderPlaced / navigation signal
//! ├── config.rs         ◄─── StorefrontConfig (TOML + env)
//! ├── telemetry.rs      ◄─── tracing subscriber setup
//! └── error.rs          ◄─── CheckoutError, SubmitError, ConfigError
//! ```
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront::build(config)                       │
//! │                                                                         │
//! │  StorageBackend::Sqlite ──► Database::new ──► KvCartRepository ──┐     │
//! │        (open failed? warn, fall back to memory)                   │     │
//! │  StorageBackend::Memory ──► MemoryKvStore ──► KvCartRepository ──┤     │
//! │                                                                   ▼     │
//! │                                            CartStore::open (Arc, once) │
//! │                                                                   │     │
//! │  begin_checkout(identity) ──► CheckoutController (Arc, per shopper)    │
//! │                                                                   │     │
//! │  submitter(&controller) ───► OrderSubmitter                            │
//! │                                ├── Arc<dyn OrderService>               │
//! │                                └── Arc<dyn OrderEventEmitter>          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_checkout::{Storefront, StorefrontConfig};
//!
//! storefront_checkout::telemetry::init_tracing();
//! let storefront = Storefront::build(StorefrontConfig::load_or_default(None)).await;
//!
//! storefront.cart().add(&product, 2).await?;
//!
//! let checkout = storefront.begin_checkout(identity)?;
//! checkout.set_shipping_field_by_name("firstName", "Ada")?;
//! // ... fill the forms, next_step() to review ...
//!
//! let order_id = storefront.submitter(&checkout).submit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart_store;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod order_service;
pub mod submitter;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use cart_store::CartStore;
pub use config::{OrderServiceSettings, StorageBackend, StorageSettings, StoreSettings, StorefrontConfig};
pub use controller::CheckoutController;
pub use error::{
    CheckoutError, CheckoutResult, ConfigError, ConfigResult, OrderError, SubmitError, SubmitResult,
};
pub use events::{Navigation, NoOpEmitter, OrderEventEmitter, OrderPlaced};
pub use order_service::{OrderService, SimulatedOrderService};
pub use submitter::OrderSubmitter;

use std::sync::Arc;
use tracing::{info, warn};

use storefront_core::UserIdentity;
use storefront_db::{CartRepository, Database, DbConfig, KvCartRepository, MemoryKvStore};

// =============================================================================
// Composition Root
// =============================================================================

/// Owns the process-wide services.
///
/// Build one per process: it holds the only [`CartStore`] for the configured
/// cart key.
pub struct Storefront {
    config: StorefrontConfig,
    cart: Arc<CartStore>,
    order_service: Arc<dyn OrderService>,
    emitter: Arc<dyn OrderEventEmitter>,
    database: Option<Database>,
}

impl Storefront {
    /// Wires storage, the cart and the simulated order service from config.
    ///
    /// Never fails: if SQLite cannot be opened the cart lives in memory for
    /// this process.
    pub async fn build(config: StorefrontConfig) -> Self {
        let (repository, database) = open_cart_repository(&config).await;
        let cart = Arc::new(CartStore::open(repository).await);
        let order_service = Arc::new(SimulatedOrderService::new(config.order_latency()));

        info!(
            backend = %config.storage.backend,
            cart_key = %config.storage.cart_key,
            "Storefront ready"
        );

        Storefront {
            config,
            cart,
            order_service,
            emitter: Arc::new(NoOpEmitter),
            database,
        }
    }

    /// Wires explicit collaborators. Used by shells with a real order
    /// backend, and by tests.
    pub async fn with_services(
        config: StorefrontConfig,
        repository: Arc<dyn CartRepository>,
        order_service: Arc<dyn OrderService>,
    ) -> Self {
        Storefront {
            cart: Arc::new(CartStore::open(repository).await),
            config,
            order_service,
            emitter: Arc::new(NoOpEmitter),
            database: None,
        }
    }

    /// Replaces the event emitter (the shell's navigation hook).
    pub fn with_emitter(mut self, emitter: Arc<dyn OrderEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    /// Starts checkout for a signed-in shopper.
    ///
    /// ## Errors
    /// [`CheckoutError::NotAuthenticated`] for an anonymous identity.
    pub fn begin_checkout(&self, identity: UserIdentity) -> CheckoutResult<Arc<CheckoutController>> {
        let controller = CheckoutController::begin(
            identity,
            Arc::clone(&self.cart),
            self.config.store.default_country.clone(),
            self.config.tax_rate(),
        )?;
        Ok(Arc::new(controller))
    }

    /// Submitter bound to `controller`, reporting the configured currency.
    pub fn submitter(&self, controller: &Arc<CheckoutController>) -> OrderSubmitter {
        OrderSubmitter::new(
            Arc::clone(controller),
            Arc::clone(&self.order_service),
            Arc::clone(&self.emitter),
        )
        .with_currency(self.config.store.currency.clone())
    }

    /// Closes the database pool, if one is open.
    pub async fn shutdown(&self) {
        if let Some(db) = &self.database {
            db.close().await;
        }
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.config)
            .field("cart", &self.cart)
            .field("database", &self.database.is_some())
            .finish_non_exhaustive()
    }
}

/// Opens the configured backend, falling back to memory.
async fn open_cart_repository(config: &StorefrontConfig) -> (Arc<dyn CartRepository>, Option<Database>) {
    let key = config.storage.cart_key.clone();

    if config.storage.backend == StorageBackend::Sqlite {
        match config.database_path() {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        warn!(error = %e, dir = %parent.display(), "Could not create data directory");
                    }
                }

                match Database::new(DbConfig::new(&path)).await {
                    Ok(db) => {
                        info!(path = %path.display(), "Cart storage opened");
                        let repository: Arc<dyn CartRepository> = Arc::new(db.carts(key));
                        return (repository, Some(db));
                    }
                    Err(e) => {
                        warn!(error = %e, path = %path.display(), "Cart storage unavailable, keeping cart in memory");
                    }
                }
            }
            None => warn!("No data directory available, keeping cart in memory"),
        }
    }

    let repository: Arc<dyn CartRepository> =
        Arc::new(KvCartRepository::new(Arc::new(MemoryKvStore::new()), key));
    (repository, None)
}

// =============================================================================
// Tests
// =============================================================================
