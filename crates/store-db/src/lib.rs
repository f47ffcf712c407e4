//! # store-db: Database Layer
//!
//! SQLite persistence for the storefront backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       apps/api (HTTP)                           │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │ Database handle
//! ┌───────────────────────────▼─────────────────────────────────────┐
//! │                        store-db (this crate)                    │
//! │                                                                 │
//! │  pool        - Connection pool + configuration                  │
//! │  migrations  - Embedded schema migrations                       │
//! │  repository  - One repository per aggregate:                    │
//! │                users, categories, products, carts,              │
//! │                orders (checkout), payments (settlement)         │
//! │  error       - DbError / StoreError                             │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │ sqlx (runtime queries)
//! ┌───────────────────────────▼─────────────────────────────────────┐
//! │                      SQLite (WAL mode)                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Boundaries
//! The invariant-bearing operations (`OrderRepository::checkout`,
//! `PaymentRepository::settle`, cart mutations) each run in a single
//! transaction: partial effects are never visible.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-export main types for convenience
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::cart::{CartLine, CartRepository, CartView};
pub use repository::category::CategoryRepository;
pub use repository::order::{CheckoutOutcome, OrderRepository};
pub use repository::payment::{PaymentRepository, SettlementOutcome};
pub use repository::product::{ProductPage, ProductQuery, ProductRepository};
pub use repository::user::UserRepository;

// Re-export core types that database consumers commonly need
pub use store_core::{
    Cart, CartItem, Category, CoreError, Invoice, Money, Order, OrderItem, OrderStatus, Payment,
    PaymentMethod, PaymentStatus, Product, Role, User,
};
