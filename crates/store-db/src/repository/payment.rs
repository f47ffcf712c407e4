//! Payment repository.
//!
//! Settlement is idempotent: settling an already-settled order returns the
//! original payment, transaction id, and invoice unchanged. The UNIQUE
//! constraints on payments.order_id and invoices.order_id are the storage
//! backstop for that guarantee under concurrency.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use store_core::{CoreError, Invoice, Order, Payment, PaymentMethod, PaymentStatus};

use crate::error::{DbError, DbResult, StoreResult};

/// The result of a settlement call.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementOutcome {
    pub payment: Payment,
    pub invoice: Invoice,
    /// True when the order was already settled and nothing changed.
    pub already_settled: bool,
}

/// Repository for payment and invoice operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Settles payment for an order.
    ///
    /// ## What Happens (one transaction)
    /// 1. Load the order; fail with `OrderNotFound` if missing
    /// 2. If a completed payment already exists, return it with its invoice
    ///    unchanged - this is the idempotent short-circuit
    /// 3. Otherwise complete the pending payment (or create one), minting a
    ///    `TXN-` prefixed UUID transaction id
    /// 4. Issue the invoice if one doesn't exist yet
    /// 5. Transition the order `pending → shipped` with a guarded UPDATE;
    ///    orders in any other state are left alone
    pub async fn settle(&self, order_id: &str, method: PaymentMethod) -> StoreResult<SettlementOutcome> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        let existing = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(payment) = &existing {
            if payment.is_completed() {
                let invoice = self.load_invoice(&mut tx, order_id).await?;
                tx.commit().await?;

                debug!(order_id = %order_id, "Order already settled, returning unchanged");

                return Ok(SettlementOutcome {
                    payment: payment.clone(),
                    invoice,
                    already_settled: true,
                });
            }
        }

        let now = Utc::now();
        let transaction_id = format!("TXN-{}", Uuid::new_v4());

        let payment = match existing {
            Some(mut payment) => {
                // Complete the pending payment, keeping its original
                // transaction id if one was already minted.
                let txn = payment
                    .transaction_id
                    .clone()
                    .unwrap_or(transaction_id);

                sqlx::query(
                    "UPDATE payments SET status = ?, method = ?, transaction_id = ? WHERE id = ?",
                )
                .bind(PaymentStatus::Completed)
                .bind(method)
                .bind(&txn)
                .bind(&payment.id)
                .execute(&mut *tx)
                .await?;

                payment.status = PaymentStatus::Completed;
                payment.method = method;
                payment.transaction_id = Some(txn);
                payment
            }
            None => {
                let payment = Payment {
                    id: Uuid::new_v4().to_string(),
                    order_id: order_id.to_string(),
                    amount_cents: order.amount_cents,
                    method,
                    status: PaymentStatus::Completed,
                    transaction_id: Some(transaction_id),
                    created_at: now,
                };

                sqlx::query(
                    r#"
                    INSERT INTO payments (id, order_id, amount_cents, method, status,
                                          transaction_id, created_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&payment.id)
                .bind(&payment.order_id)
                .bind(payment.amount_cents)
                .bind(payment.method)
                .bind(payment.status)
                .bind(&payment.transaction_id)
                .bind(payment.created_at)
                .execute(&mut *tx)
                .await?;

                payment
            }
        };

        // OR IGNORE: the UNIQUE(order_id) constraint guarantees at most one
        // invoice even if two settlements race past the short-circuit.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO invoices (id, order_id, amount_cents, invoice_date, shipping_date)
            VALUES (?, ?, ?, ?, NULL)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id)
        .bind(order.amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let invoice = self.load_invoice(&mut tx, order_id).await?;

        // Guarded transition: only pending orders move to shipped.
        sqlx::query("UPDATE orders SET status = 'shipped' WHERE id = ? AND status = 'pending'")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            order_id = %order_id,
            payment_id = %payment.id,
            amount_cents = payment.amount_cents,
            "Payment settled"
        );

        Ok(SettlementOutcome {
            payment,
            invoice,
            already_settled: false,
        })
    }

    /// Gets the payment for an order, if any.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Gets the invoice for an order.
    pub async fn invoice_for_order(&self, order_id: &str) -> DbResult<Invoice> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", order_id))
    }

    async fn load_invoice(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        order_id: &str,
    ) -> Result<Invoice, DbError> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", order_id))
    }
}
