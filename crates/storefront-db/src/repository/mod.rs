//! # Repository Module
//!
//! Storage capabilities for the storefront.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartStore (storefront-checkout)                                        │
//! │       │                                                                 │
//! │       │  carts.load() / carts.save(&cart)                               │
//! │       ▼                                                                 │
//! │  CartRepository ── KvCartRepository                                    │
//! │       │                                                                 │
//! │       │  get("cart") / set("cart", json)                                │
//! │       ▼                                                                 │
//! │  KeyValueStore ── SqliteKvStore | MemoryKvStore                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KeyValueStore`] - Raw string storage
//! - [`cart::CartRepository`] - Cart load/save as JSON

pub mod cart;
pub mod kv;
