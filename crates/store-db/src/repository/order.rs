//! Order repository.
//!
//! Checkout is the invariant-bearing operation of this module: it converts
//! a cart into an immutable order inside one transaction, decrementing
//! stock with a guarded UPDATE so concurrent checkouts can never drive
//! stock negative.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use store_core::{CoreError, Order, OrderItem, OrderStatus};

use crate::error::{DbResult, StoreResult};

/// A cart line with the catalog data checkout needs, read inside the
/// checkout transaction.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: String,
    quantity: i64,
    price_cents: i64,
}

/// The result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new order repository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Converts the user's cart into an order.
    ///
    /// ## What Happens (one transaction)
    /// 1. Read the cart lines joined with current product prices
    /// 2. Fail with `EmptyCart` if there are none
    /// 3. For each line, decrement stock with
    ///    `UPDATE ... SET stock = stock - ? WHERE id = ? AND stock >= ?`;
    ///    zero rows affected means insufficient stock and aborts everything
    /// 4. Insert the order with the total computed from current prices,
    ///    and one order item per line with the unit price frozen
    /// 5. Empty the cart
    ///
    /// Either all of it happens or none of it does.
    pub async fn checkout(&self, user_id: &str) -> StoreResult<CheckoutOutcome> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as::<_, CheckoutLine>(
            r#"
            SELECT ci.product_id, ci.quantity, p.price_cents
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN products p ON p.id = ci.product_id
            WHERE c.user_id = ?
            ORDER BY ci.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        // Guarded decrement per line. The WHERE stock >= ? clause makes the
        // check and the write one atomic statement.
        for line in &lines {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ? AND stock >= ?",
            )
            .bind(line.quantity)
            .bind(Utc::now())
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?")
                        .bind(&line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                return match available {
                    Some(stock) => Err(CoreError::InsufficientStock {
                        product_id: line.product_id.clone(),
                        available: stock,
                        requested: line.quantity,
                    }
                    .into()),
                    None => Err(CoreError::ProductNotFound(line.product_id.clone()).into()),
                };
            }

            debug!(
                product_id = %line.product_id,
                quantity = line.quantity,
                "Decremented stock"
            );
        }

        let amount_cents: i64 = lines.iter().map(|l| l.price_cents * l.quantity).sum();

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            amount_cents,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO orders (id, user_id, status, amount_cents, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.amount_cents)
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let item = OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price_cents: line.price_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price_cents, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        sqlx::query(
            "DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE user_id = ?)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            user_id = %user_id,
            amount_cents,
            line_count = items.len(),
            "Checkout complete"
        );

        Ok(CheckoutOutcome { order, items })
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
    }

    /// Lists all orders, newest first (admin view).
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists one user's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Returns the line items of an order.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}
