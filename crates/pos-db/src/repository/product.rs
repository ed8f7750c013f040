//! # Product Repository
//!
//! Database operations for products, plus the stock validator used both at
//! add-to-cart time and inside the checkout transaction.
//!
//! ## Stock Validation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_to_cart                        checkout                            │
//! │      │                                  │                               │
//! │      ▼                                  ▼                               │
//! │  check_stock(&pool, ..)            check_stock(&mut *tx, ..)            │
//! │  advisory, may be stale            authoritative, under write lock      │
//! │      │                                  │                               │
//! │      └──────────────┬───────────────────┘                               │
//! │                     ▼                                                   │
//! │   SELECT name, stock FROM products WHERE id = ? AND store_id = ?        │
//! │                     │                                                   │
//! │        no row ──► ProductNotFound                                       │
//! │        stock < requested ──► InsufficientStock                          │
//! │        otherwise ──► Ok(stock)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{CheckoutError, DbResult};
use pos_core::validation::validate_price_cents;
use pos_core::{CoreError, Money, Product, ProductRef, ProductStatus};

/// Row shape of `products`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRecord {
    id: i64,
    store_id: i64,
    name: String,
    price_cents: Money,
    stock: i64,
    status: ProductStatus,
    barcode: Option<String>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            store_id: r.store_id,
            name: r.name,
            price: r.price_cents,
            stock: r.stock,
            status: r.status,
            barcode: r.barcode,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, store_id, name, price_cents, stock, status, barcode";

/// Fields for inserting a product (back office and seed data).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub store_id: i64,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub barcode: Option<String>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by id, only if it belongs to `store_id`.
    pub async fn get_in_store(&self, id: i64, store_id: i64) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND store_id = ?2",
            PRODUCT_COLUMNS
        );
        let record = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Product::from))
    }

    /// Gets a product by barcode within one store.
    pub async fn get_by_barcode(&self, barcode: &str, store_id: i64) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE barcode = ?1 AND store_id = ?2 ORDER BY id LIMIT 1",
            PRODUCT_COLUMNS
        );
        let record = sqlx::query_as::<_, ProductRecord>(&sql)
            .bind(barcode)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Product::from))
    }

    /// Resolves what the cashier scanned or picked into a product of the store.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Found in this store
    /// * `Err(CheckoutError::Core(ProductNotFound))` - Missing or in another store
    pub async fn resolve(&self, product: &ProductRef, store_id: i64) -> Result<Product, CheckoutError> {
        debug!(product = %product, store_id, "Resolving product");

        let found = match product {
            ProductRef::Id(id) => self.get_in_store(*id, store_id).await?,
            ProductRef::Barcode(code) => self.get_by_barcode(code, store_id).await?,
        };

        found.ok_or_else(|| CoreError::ProductNotFound(product.to_string()).into())
    }

    /// Current stock of a product, if it exists.
    pub async fn get_stock(&self, id: i64) -> DbResult<Option<i64>> {
        let stock = sqlx::query_scalar::<_, i64>("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Inserts a product and returns its id. Status is derived from stock.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i64> {
        validate_price_cents(product.price.cents())?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (store_id, name, price_cents, stock, status, barcode)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(product.store_id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(ProductStatus::from_stock(product.stock))
        .bind(&product.barcode)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %product.name, "Product inserted");
        Ok(id)
    }

    /// Counts products (seed idempotency, diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Stock Validator
// =============================================================================

/// Checks that `requested` units of a product are on hand right now.
///
/// Always a fresh read. Pass the pool for an advisory check, or the open
/// transaction for the authoritative one.
///
/// ## Returns
/// * `Ok(stock)` - Current stock, at least `requested`
/// * `Err(Core(ProductNotFound))` - No such product in this store
/// * `Err(Core(InsufficientStock))` - Not enough on hand
pub async fn check_stock<'e, E>(
    executor: E,
    product_id: i64,
    store_id: i64,
    requested: i64,
) -> Result<i64, CheckoutError>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<(String, i64)> =
        sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1 AND store_id = ?2")
            .bind(product_id)
            .bind(store_id)
            .fetch_optional(executor)
            .await?;

    let (name, available) =
        row.ok_or_else(|| CoreError::ProductNotFound(format!("#{}", product_id)))?;

    if available < requested {
        return Err(CoreError::InsufficientStock {
            product_id,
            name,
            available,
            requested,
        }
        .into());
    }

    Ok(available)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbError};
    use pos_core::ValidationError;

    async fn setup() -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let store_id = db.stores().insert("Main Branch").await.unwrap();
        (db, store_id)
    }

    fn new_product(store_id: i64, name: &str, price: i64, stock: i64) -> NewProduct {
        NewProduct {
            store_id,
            name: name.to_string(),
            price: Money::from_cents(price),
            stock,
            barcode: Some(format!("BC-{}", name)),
        }
    }

    #[tokio::test]
    async fn test_insert_and_resolve() {
        let (db, store_id) = setup().await;
        let id = db
            .products()
            .insert(&new_product(store_id, "Milk", 1000, 5))
            .await
            .unwrap();

        let by_id = db.products().resolve(&ProductRef::Id(id), store_id).await.unwrap();
        assert_eq!(by_id.name, "Milk");
        assert_eq!(by_id.price.cents(), 1000);
        assert_eq!(by_id.status, ProductStatus::LowStock);

        let by_code = db
            .products()
            .resolve(&ProductRef::Barcode("BC-Milk".to_string()), store_id)
            .await
            .unwrap();
        assert_eq!(by_code.id, id);
    }

    #[tokio::test]
    async fn test_negative_price_is_validation_error() {
        let (db, store_id) = setup().await;
        let err = db
            .products()
            .insert(&new_product(store_id, "Soap", -1, 5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resolve_wrong_store_is_not_found() {
        let (db, store_id) = setup().await;
        let other_store = db.stores().insert("Annex").await.unwrap();
        let id = db
            .products()
            .insert(&new_product(store_id, "Bread", 500, 20))
            .await
            .unwrap();

        let err = db
            .products()
            .resolve(&ProductRef::Id(id), other_store)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_check_stock() {
        let (db, store_id) = setup().await;
        let id = db
            .products()
            .insert(&new_product(store_id, "Eggs", 300, 3))
            .await
            .unwrap();

        assert_eq!(check_stock(db.pool(), id, store_id, 3).await.unwrap(), 3);

        let err = check_stock(db.pool(), id, store_id, 4).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Core(CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            })
        ));

        let err = check_stock(db.pool(), id + 100, store_id, 1).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::ProductNotFound(_))));
    }
}
