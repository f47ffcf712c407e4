//! # Domain Types
//!
//! Core domain types used throughout the storefront backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                               │
//! │                                                                    │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐            │
//! │  │   Product    │   │    Order     │   │   Payment    │            │
//! │  │ ───────────  │   │ ───────────  │   │ ───────────  │            │
//! │  │ id (UUID)    │   │ id (UUID)    │   │ id (UUID)    │            │
//! │  │ price_cents  │   │ status       │   │ order_id 1:1 │            │
//! │  │ stock        │   │ amount_cents │   │ transaction  │            │
//! │  └──────────────┘   └──────────────┘   └──────────────┘            │
//! │                                                                    │
//! │  Cart ──owns──► CartItem        Order ──owns──► OrderItem          │
//! │  (pre-checkout only)            (immutable, price snapshot)        │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity has a UUID v4 `id` used for database relations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization role of a user.
///
/// Role checks are a capability predicate on the principal - there is no
/// separate policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    /// True when this principal may perform administrative operations.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
    Wallet,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

// =============================================================================
// Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// Checkout creates orders as `Pending`; payment settlement transitions
/// them to `Shipped`. `Delivered` and `Cancelled` are terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique display name.
    pub username: String,

    /// Unique email, doubles as the login identifier.
    pub email: String,

    /// Argon2 password hash. Never serialized to clients by the API layer.
    pub password_hash: String,

    /// Free-form location string.
    pub location: String,

    /// Authorization role.
    pub role: Role,

    /// Preferred payment method, used as the default at settlement.
    pub payment_method: PaymentMethod,

    /// Whether the account email has been verified.
    pub is_verified: bool,

    /// When the account was created.
    pub joined_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    /// Unique category name.
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Available inventory. Invariant: never negative. Mutated only by
    /// checkout (decrement) and admin product updates.
    pub stock: i64,

    /// Low-stock threshold for reporting.
    pub min_stock_level: i64,

    /// Owning category, if any.
    pub category_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity can be fulfilled from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A per-user staging area for intended purchases.
///
/// Created lazily on first access; cleared on checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line in a cart.
///
/// Invariant: at most one line per (cart, product) pair - repeated adds
/// merge into the existing line instead of duplicating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    /// Always >= 1; a line that would drop below 1 is deleted instead.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// An immutable record of a completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    /// Total in cents, computed once at checkout and never recomputed.
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A line item in an order.
///
/// Uses the snapshot pattern: the unit price is frozen at purchase time and
/// stays valid even when the catalog price changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Line total (frozen unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A payment towards an order. At most one per order (1:1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Globally unique settlement token. Stable across repeated settlement
    /// calls for the same order.
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// True once this payment has settled; further settlement calls must
    /// return it unchanged.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice issued exactly once, at the moment payment completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    pub amount_cents: i64,
    pub invoice_date: DateTime<Utc>,
    pub shipping_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_predicate() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_product_has_stock() {
        let product = Product {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            description: None,
            price_cents: 1000,
            stock: 5,
            min_stock_level: 1,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.has_stock(5));
        assert!(!product.has_stock(6));
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            price_cents: 299,
            created_at: Utc::now(),
        };

        assert_eq!(item.line_total().cents(), 897);
    }
}
