//! # Checkout Repository
//!
//! Commits a validated [`CheckoutPlan`] as one atomic unit: every sale row is
//! written and every stock figure decremented, or nothing is.
//!
//! ## Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE            ← takes the write lock up front; a second  │
//! │    │                          checkout waits (busy_timeout) here       │
//! │    │                                                                    │
//! │    ├── for each cart line:                                             │
//! │    │     check_stock(tx)    ← live row, not the cart snapshot          │
//! │    │     INSERT INTO sales  ← status Completed, shared batch_id        │
//! │    │     UPDATE products                                               │
//! │    │        SET stock = stock - qty                                    │
//! │    │      WHERE id = ? AND store_id = ? AND stock >= qty               │
//! │    │        └── 0 rows affected ──► InsufficientStock                  │
//! │    │     SELECT stock       ← read back, recompute status flag         │
//! │    │                                                                    │
//! │    ├── any error ──► ROLLBACK, return error                            │
//! │    │                                                                    │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is what keeps stock from going negative when two
//! sessions check out the same product. The read before it only produces a
//! precise error message.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::product::check_stock;
use super::sale::{fetch_sale, insert_sale, NewSale};
use crate::error::CheckoutError;
use pos_core::{CheckoutPlan, CoreError, ProductStatus, SaleStatus, SaleTransaction, UpdatedStock};

/// What a committed checkout wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub batch_id: String,
    /// One row per cart line, in cart order.
    pub transactions: Vec<SaleTransaction>,
    /// Stock after the decrement, one entry per cart line.
    pub updated_products: Vec<UpdatedStock>,
}

/// Repository owning the checkout transaction.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    /// Commits a checkout plan atomically.
    ///
    /// ## Errors
    /// * `Core(InsufficientStock)` - A line's live stock is short, or another
    ///   checkout took it first. Nothing is written.
    /// * `Core(ProductNotFound)` - A product vanished from its store.
    /// * `Db(..)` - Storage fault. Nothing is written.
    pub async fn commit(&self, plan: &CheckoutPlan) -> Result<CheckoutOutcome, CheckoutError> {
        debug!(
            batch_id = %plan.batch_id,
            lines = plan.lines.len(),
            total = %plan.total,
            "Beginning checkout transaction"
        );

        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        match apply(&mut *tx, plan).await {
            Ok(outcome) => {
                tx.commit().await?;
                info!(
                    batch_id = %plan.batch_id,
                    lines = outcome.transactions.len(),
                    total = %plan.total,
                    "Checkout committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, batch_id = %plan.batch_id, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Runs every write of a checkout on an open transaction.
async fn apply(conn: &mut SqliteConnection, plan: &CheckoutPlan) -> Result<CheckoutOutcome, CheckoutError> {
    let created_at = Utc::now();
    let mut transactions = Vec::with_capacity(plan.lines.len());
    let mut updated_products = Vec::with_capacity(plan.lines.len());

    for line in &plan.lines {
        check_stock(&mut *conn, line.product_id, line.store_id, line.quantity).await?;

        let sale_id = insert_sale(
            &mut *conn,
            &NewSale {
                batch_id: &plan.batch_id,
                store_id: line.store_id,
                product_id: line.product_id,
                product_name: &line.name,
                customer_name: &plan.customer_name,
                quantity: line.quantity,
                amount: line.subtotal,
                date: plan.date,
                payment_method: &plan.payment_method,
                status: SaleStatus::Completed,
                amount_paid: plan.amount_paid,
                change_given: plan.change_given,
                created_at,
            },
        )
        .await?;

        let decremented = sqlx::query(
            r#"
            UPDATE products
               SET stock = stock - ?1
             WHERE id = ?2 AND store_id = ?3 AND stock >= ?1
            "#,
        )
        .bind(line.quantity)
        .bind(line.product_id)
        .bind(line.store_id)
        .execute(&mut *conn)
        .await?;

        if decremented.rows_affected() != 1 {
            let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(line.product_id)
                .fetch_optional(&mut *conn)
                .await?
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id,
                name: line.name.clone(),
                available,
                requested: line.quantity,
            }
            .into());
        }

        let stock: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(line.product_id)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("UPDATE products SET status = ?1 WHERE id = ?2")
            .bind(ProductStatus::from_stock(stock))
            .bind(line.product_id)
            .execute(&mut *conn)
            .await?;

        debug!(product_id = line.product_id, quantity = line.quantity, stock, "Line committed");

        transactions.push(fetch_sale(&mut *conn, sale_id).await?);
        updated_products.push(UpdatedStock {
            id: line.product_id,
            stock,
        });
    }

    Ok(CheckoutOutcome {
        batch_id: plan.batch_id.clone(),
        transactions,
        updated_products,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
