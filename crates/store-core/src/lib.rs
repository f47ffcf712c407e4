//! # store-core: Pure Business Logic for the Storefront Backend
//!
//! This crate is the heart of the storefront: all business logic lives here
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Architecture                        │
//! │                                                                    │
//! │  HTTP Client                                                       │
//! │       │                                                            │
//! │  ┌────▼───────────────────────────────────────────────────────┐    │
//! │  │                  apps/api (axum handlers)                  │    │
//! │  │   register, login, catalog CRUD, cart, checkout, payment   │    │
//! │  └────┬───────────────────────────────────────────────────────┘    │
//! │       │                                                            │
//! │  ┌────▼───────────────────────────────────────────────────────┐    │
//! │  │              ★ store-core (THIS CRATE) ★                   │    │
//! │  │                                                            │    │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐    │    │
//! │  │   │  types  │  │  money  │  │  error  │  │ validation │    │    │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘    │    │
//! │  │                                                            │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS       │    │
//! │  └────┬───────────────────────────────────────────────────────┘    │
//! │       │                                                            │
//! │  ┌────▼───────────────────────────────────────────────────────┐    │
//! │  │                 store-db (Database Layer)                  │    │
//! │  │       SQLite queries, migrations, repositories             │    │
//! │  └────────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Payment, Invoice, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in a cart line.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price in cents ($1,000,000,000.00).
///
/// Keeps `price × quantity` and order totals far away from i64 overflow:
/// a maximal line is MAX_PRICE_CENTS × MAX_ITEM_QUANTITY ≈ 1e14.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Default page size for paginated catalog listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;
