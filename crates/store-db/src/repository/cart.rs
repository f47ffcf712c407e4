//! Cart repository.
//!
//! Per-user staging area for intended purchases. One cart per user,
//! created lazily on first access; at most one line per product, with
//! repeated adds merging into the existing line.
//!
//! ## Removal Semantics
//! `remove_item` either decrements the line or deletes it, never both:
//! removing fewer units than the line holds decrements, removing exactly
//! what it holds deletes, and removing more fails without touching the
//! line.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use store_core::{validation, Cart, CartItem, CoreError, Money};

use crate::error::{DbError, StoreResult};

/// A cart line joined with the catalog data needed to display it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub product_name: String,
    /// Current catalog price; carts show live prices, only orders snapshot.
    pub price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    /// Line total at the current catalog price.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

/// A cart together with its lines and running total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
    pub total_cents: i64,
}

/// Repository for cart operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new cart repository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets the user's cart, creating an empty one if none exists yet.
    pub async fn get_or_create(&self, user_id: &str) -> StoreResult<Cart> {
        if let Some(cart) = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(cart);
        }

        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        debug!(cart_id = %cart.id, user_id = %user_id, "Creating cart");

        sqlx::query("INSERT INTO carts (id, user_id, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(&cart.id)
            .bind(&cart.user_id)
            .bind(cart.created_at)
            .bind(cart.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(cart)
    }

    /// Returns the user's cart with all lines and the running total.
    pub async fn view(&self, user_id: &str) -> StoreResult<CartView> {
        let cart = self.get_or_create(user_id).await?;

        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT ci.id, ci.cart_id, ci.product_id,
                   p.name AS product_name, p.price_cents, ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?
            ORDER BY ci.created_at ASC
            "#,
        )
        .bind(&cart.id)
        .fetch_all(&self.pool)
        .await?;

        let total_cents: i64 = lines.iter().map(|l| l.line_total().cents()).sum();

        Ok(CartView {
            cart,
            lines,
            total_cents,
        })
    }

    /// Adds a product to the user's cart.
    ///
    /// ## Rules
    /// - Quantity must be between 1 and the per-line maximum
    /// - The product must exist
    /// - If the cart already holds a line for this product, the quantities
    ///   merge into one line
    pub async fn add_item(&self, user_id: &str, product_id: &str, quantity: i64) -> StoreResult<CartItem> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let cart = self.get_or_create(user_id).await?;

        let mut tx = self.pool.begin().await?;

        let product_exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

        if product_exists.is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let existing = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = ? AND product_id = ?",
        )
        .bind(&cart.id)
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let item = match existing {
            Some(mut item) => {
                let merged = item.quantity + quantity;
                validation::validate_quantity(merged).map_err(CoreError::from)?;

                sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
                    .bind(merged)
                    .bind(&item.id)
                    .execute(&mut *tx)
                    .await?;

                item.quantity = merged;
                debug!(item_id = %item.id, quantity = merged, "Merged cart line");
                item
            }
            None => {
                let item = CartItem {
                    id: Uuid::new_v4().to_string(),
                    cart_id: cart.id.clone(),
                    product_id: product_id.to_string(),
                    quantity,
                    created_at: Utc::now(),
                };

                sqlx::query(
                    r#"
                    INSERT INTO cart_items (id, cart_id, product_id, quantity, created_at)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&item.id)
                .bind(&item.cart_id)
                .bind(&item.product_id)
                .bind(item.quantity)
                .bind(item.created_at)
                .execute(&mut *tx)
                .await?;

                debug!(item_id = %item.id, quantity, "Added cart line");
                item
            }
        };

        self.touch(&mut tx, &cart.id).await?;
        tx.commit().await?;

        Ok(item)
    }

    /// Sets a cart line to an absolute quantity.
    ///
    /// A quantity below 1 deletes the line.
    pub async fn update_item(&self, user_id: &str, item_id: &str, quantity: i64) -> StoreResult<()> {
        let cart = self.get_or_create(user_id).await?;

        let mut tx = self.pool.begin().await?;

        let item = self.get_owned_item(&mut tx, &cart.id, item_id).await?;

        if quantity < 1 {
            sqlx::query("DELETE FROM cart_items WHERE id = ?")
                .bind(&item.id)
                .execute(&mut *tx)
                .await?;
            debug!(item_id = %item.id, "Deleted cart line (quantity set below 1)");
        } else {
            validation::validate_quantity(quantity).map_err(CoreError::from)?;

            sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
                .bind(quantity)
                .bind(&item.id)
                .execute(&mut *tx)
                .await?;
            debug!(item_id = %item.id, quantity, "Set cart line quantity");
        }

        self.touch(&mut tx, &cart.id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Removes `quantity` units from a cart line.
    ///
    /// ## Rules
    /// - Removing more than the line holds fails; the line is unchanged
    /// - Removing exactly what it holds deletes the line
    /// - Otherwise the line is decremented
    pub async fn remove_item(&self, user_id: &str, item_id: &str, quantity: i64) -> StoreResult<()> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let cart = self.get_or_create(user_id).await?;

        let mut tx = self.pool.begin().await?;

        let item = self.get_owned_item(&mut tx, &cart.id, item_id).await?;

        if quantity > item.quantity {
            return Err(CoreError::InsufficientQuantity {
                available: item.quantity,
                requested: quantity,
            }
            .into());
        }

        let remaining = item.quantity - quantity;

        if remaining == 0 {
            sqlx::query("DELETE FROM cart_items WHERE id = ?")
                .bind(&item.id)
                .execute(&mut *tx)
                .await?;
            debug!(item_id = %item.id, "Removed cart line");
        } else {
            sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
                .bind(remaining)
                .bind(&item.id)
                .execute(&mut *tx)
                .await?;
            debug!(item_id = %item.id, remaining, "Decremented cart line");
        }

        self.touch(&mut tx, &cart.id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Removes every line from the user's cart.
    pub async fn clear(&self, user_id: &str) -> StoreResult<()> {
        let cart = self.get_or_create(user_id).await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(&cart.id)
            .execute(&self.pool)
            .await?;

        debug!(cart_id = %cart.id, "Cleared cart");
        Ok(())
    }

    /// Fetches a line and verifies it belongs to the given cart.
    ///
    /// Ownership is part of the WHERE clause, so a line id from another
    /// user's cart behaves exactly like a missing one.
    async fn get_owned_item(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        cart_id: &str,
        item_id: &str,
    ) -> StoreResult<CartItem> {
        sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE id = ? AND cart_id = ?")
            .bind(item_id)
            .bind(cart_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::CartItemNotFound(item_id.to_string()).into())
    }

    /// Bumps the cart's updated_at inside the current transaction.
    async fn touch(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        cart_id: &str,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(cart_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
