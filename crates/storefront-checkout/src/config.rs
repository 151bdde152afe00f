//! # Storefront Configuration
//!
//! Configuration for the cart and checkout services.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_TAX_RATE_BPS=825                                        │
//! │     STOREFRONT_STORAGE=memory                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │     ~/Library/Application Support/com.storefront.storefront/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     10% tax, US, SQLite storage, 2000 ms simulated order latency        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! tax_rate_bps = 1000      # 10%
//! default_country = "US"   # US | CA | UK | AU
//! currency = "USD"
//!
//! [storage]
//! backend = "sqlite"       # sqlite | memory
//! database_path = "/var/lib/storefront/storefront.db"
//! cart_key = "cart"
//!
//! [order_service]
//! simulated_latency_ms = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use storefront_core::{TaxRate, CART_STORAGE_KEY, DEFAULT_COUNTRY, DEFAULT_TAX_RATE_BPS, SUPPORTED_COUNTRIES};

use crate::error::{ConfigError, ConfigResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

/// Database file name in the platform data directory.
pub const DATABASE_FILE_NAME: &str = "storefront.db";

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

// =============================================================================
// Store Settings
// =============================================================================

/// Pricing and locale settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Sales tax on the cart subtotal, in basis points.
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// Country pre-selected on the shipping form.
    #[serde(default = "default_country")]
    pub default_country: String,

    /// ISO 4217 currency code. Prices are integer minor units of it.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            tax_rate_bps: default_tax_rate_bps(),
            default_country: default_country(),
            currency: default_currency(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite file in the platform data directory (or `database_path`).
    #[default]
    Sqlite,

    /// Process memory only. The cart is lost on exit.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(StorageBackend::Sqlite),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Explicit database file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Key the cart is stored under.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_cart_key() -> String {
    CART_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            database_path: None,
            cart_key: default_cart_key(),
        }
    }
}

// =============================================================================
// Order Service Settings
// =============================================================================

/// Settings for the built-in simulated order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderServiceSettings {
    /// Delay before the simulated service confirms an order.
    #[serde(default = "default_latency_ms")]
    pub simulated_latency_ms: u64,
}

fn default_latency_ms() -> u64 {
    2000
}

impl Default for OrderServiceSettings {
    fn default() -> Self {
        OrderServiceSettings {
            simulated_latency_ms: default_latency_ms(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub order_service: OrderServiceSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`storefront.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.tax_rate_bps > 10_000 {
            return Err(ConfigError::Invalid(format!(
                "tax_rate_bps must be at most 10000, got {}",
                self.store.tax_rate_bps
            )));
        }

        if !SUPPORTED_COUNTRIES.contains(&self.store.default_country.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "default_country must be one of {:?}, got '{}'",
                SUPPORTED_COUNTRIES, self.store.default_country
            )));
        }

        let currency = &self.store.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "currency must be a three-letter ISO code, got '{}'",
                currency
            )));
        }

        if self.storage.cart_key.is_empty() {
            return Err(ConfigError::Invalid("cart_key must not be empty".into()));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// [`StorefrontConfig::load`]).
    ///
    /// Unparseable numeric or backend values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bps) = lookup("STOREFRONT_TAX_RATE_BPS") {
            match bps.parse::<u32>() {
                Ok(value) => {
                    debug!(tax_rate_bps = value, "Overriding tax rate from environment");
                    self.store.tax_rate_bps = value;
                }
                Err(_) => warn!(value = %bps, "Ignoring invalid STOREFRONT_TAX_RATE_BPS"),
            }
        }

        if let Some(country) = lookup("STOREFRONT_DEFAULT_COUNTRY") {
            self.store.default_country = country.to_uppercase();
        }

        if let Some(currency) = lookup("STOREFRONT_CURRENCY") {
            self.store.currency = currency.to_uppercase();
        }

        if let Some(backend) = lookup("STOREFRONT_STORAGE") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring STOREFRONT_STORAGE"),
            }
        }

        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(key) = lookup("STOREFRONT_CART_KEY") {
            self.storage.cart_key = key;
        }

        if let Some(ms) = lookup("STOREFRONT_ORDER_LATENCY_MS") {
            match ms.parse::<u64>() {
                Ok(value) => self.order_service.simulated_latency_ms = value,
                Err(_) => warn!(value = %ms, "Ignoring invalid STOREFRONT_ORDER_LATENCY_MS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.store.tax_rate_bps)
    }

    /// Returns the simulated order latency.
    pub fn order_latency(&self) -> Duration {
        Duration::from_millis(self.order_service.simulated_latency_ms)
    }

    /// Resolves the SQLite file: explicit path, else the platform data
    /// directory. `None` if neither is available.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "storefront", "storefront")
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        })
    }
}
