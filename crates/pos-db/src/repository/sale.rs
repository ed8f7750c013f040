//! # Sale Repository
//!
//! Reads and deletes committed sale rows. Rows are only ever written by the
//! checkout transaction (see [`super::checkout`]), through [`insert_sale`].
//!
//! ## Sales Listing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SalesFilter { status?, store_id?, date_from?, date_to? }               │
//! │       │                                                                 │
//! │       ├──► SELECT COUNT(*) ... WHERE <filter>        → total_rows       │
//! │       │                                                                 │
//! │       └──► SELECT ... LEFT JOIN stores ... WHERE <filter>               │
//! │            ORDER BY s.date DESC, s.id DESC                              │
//! │            LIMIT page_size OFFSET (page-1)*page_size → rows             │
//! │                                                                         │
//! │  total_pages = ceil(total_rows / page_size)                             │
//! │                                                                         │
//! │  `id` breaks ties within a date, so every matching row appears on      │
//! │  exactly one page.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use pos_core::validation::PageRequest;
use pos_core::{Money, SaleStatus, SaleTransaction};

/// Row shape of `sales` joined with `stores`.
#[derive(Debug, sqlx::FromRow)]
struct SaleRecord {
    id: i64,
    batch_id: String,
    store_id: i64,
    store_name: Option<String>,
    product_id: i64,
    product_name: String,
    customer_name: String,
    quantity: i64,
    amount_cents: Money,
    date: NaiveDate,
    payment_method: String,
    status: SaleStatus,
    amount_paid_cents: Money,
    change_given_cents: Money,
    created_at: DateTime<Utc>,
}

impl From<SaleRecord> for SaleTransaction {
    fn from(r: SaleRecord) -> Self {
        SaleTransaction {
            id: r.id,
            batch_id: r.batch_id,
            store_id: r.store_id,
            store_name: r.store_name,
            product_id: r.product_id,
            product_name: r.product_name,
            customer_name: r.customer_name,
            quantity: r.quantity,
            amount: r.amount_cents,
            date: r.date,
            payment_method: r.payment_method,
            status: r.status,
            amount_paid: r.amount_paid_cents,
            change_given: r.change_given_cents,
            created_at: r.created_at,
        }
    }
}

const SALE_SELECT: &str = r#"
    SELECT s.id, s.batch_id, s.store_id, st.store_name, s.product_id, s.product_name,
           s.customer_name, s.quantity, s.amount_cents, s.date, s.payment_method,
           s.status, s.amount_paid_cents, s.change_given_cents, s.created_at
    FROM sales s
    LEFT JOIN stores st ON st.id = s.store_id
"#;

// =============================================================================
// Filter & Page
// =============================================================================

/// Optional narrowing of the sales listing. Empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub status: Option<SaleStatus>,
    pub store_id: Option<i64>,
    /// Inclusive.
    pub date_from: Option<NaiveDate>,
    /// Inclusive.
    pub date_to: Option<NaiveDate>,
}

impl SalesFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(status) = self.status {
            qb.push(" AND s.status = ").push_bind(status);
        }
        if let Some(store_id) = self.store_id {
            qb.push(" AND s.store_id = ").push_bind(store_id);
        }
        if let Some(from) = self.date_from {
            qb.push(" AND s.date >= ").push_bind(from);
        }
        if let Some(to) = self.date_to {
            qb.push(" AND s.date <= ").push_bind(to);
        }
    }
}

/// One page of the sales listing.
#[derive(Debug, Clone, Serialize)]
pub struct SalesPage {
    pub rows: Vec<SaleTransaction>,
    pub page: i64,
    pub page_size: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

// =============================================================================
// Insert (checkout transaction only)
// =============================================================================

/// Fields of a sale line written by checkout.
#[derive(Debug, Clone)]
pub struct NewSale<'a> {
    pub batch_id: &'a str,
    pub store_id: i64,
    pub product_id: i64,
    pub product_name: &'a str,
    pub customer_name: &'a str,
    pub quantity: i64,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: &'a str,
    pub status: SaleStatus,
    pub amount_paid: Money,
    pub change_given: Money,
    pub created_at: DateTime<Utc>,
}

/// Inserts one sale row on an open connection and returns its id.
pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &NewSale<'_>) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sales (
            batch_id, store_id, product_id, product_name, customer_name, quantity,
            amount_cents, date, payment_method, status, amount_paid_cents,
            change_given_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(sale.batch_id)
    .bind(sale.store_id)
    .bind(sale.product_id)
    .bind(sale.product_name)
    .bind(sale.customer_name)
    .bind(sale.quantity)
    .bind(sale.amount)
    .bind(sale.date)
    .bind(sale.payment_method)
    .bind(sale.status)
    .bind(sale.amount_paid)
    .bind(sale.change_given)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Reads back one sale row with its store name, on an open connection.
pub(crate) async fn fetch_sale(conn: &mut SqliteConnection, id: i64) -> DbResult<SaleTransaction> {
    let sql = format!("{} WHERE s.id = ?1", SALE_SELECT);
    let record = sqlx::query_as::<_, SaleRecord>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(record.into())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists sales matching `filter`, newest first.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = db
    ///     .sales()
    ///     .list(&SalesFilter::default(), validate_page(1, 10)?)
    ///     .await?;
    /// ```
    pub async fn list(&self, filter: &SalesFilter, page: PageRequest) -> DbResult<SalesPage> {
        debug!(?filter, page = page.page, page_size = page.page_size, "Listing sales");

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sales s");
        filter.push_where(&mut count_qb);
        let total_rows: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new(SALE_SELECT);
        filter.push_where(&mut qb);
        qb.push(" ORDER BY s.date DESC, s.id DESC LIMIT ")
            .push_bind(page.page_size)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb
            .build_query_as::<SaleRecord>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SaleTransaction::from)
            .collect();

        Ok(SalesPage {
            rows,
            page: page.page,
            page_size: page.page_size,
            total_rows,
            total_pages: page.total_pages(total_rows),
        })
    }

    /// All rows of one checkout, in insertion order.
    pub async fn get_by_batch(&self, batch_id: &str) -> DbResult<Vec<SaleTransaction>> {
        let sql = format!("{} WHERE s.batch_id = ?1 ORDER BY s.id", SALE_SELECT);
        let rows = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(batch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(SaleTransaction::from).collect())
    }

    /// Deletes one sale row. Stock is not restored.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(id, "Sale deleted");
        Ok(())
    }

    /// Counts all sale rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
