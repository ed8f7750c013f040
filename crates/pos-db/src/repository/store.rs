//! # Store Repository
//!
//! Branches of the mall. Products and sales each belong to one store.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pos_core::ValidationError;

/// Repository for store operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Inserts an active store and returns its id.
    pub async fn insert(&self, store_name: &str) -> DbResult<i64> {
        let store_name = store_name.trim();
        if store_name.is_empty() {
            return Err(ValidationError::Required {
                field: "store_name".to_string(),
            }
            .into());
        }

        let result = sqlx::query("INSERT INTO stores (store_name) VALUES (?1)")
            .bind(store_name)
            .execute(&self.pool)
            .await?;

        debug!(id = result.last_insert_rowid(), store_name, "Store inserted");
        Ok(result.last_insert_rowid())
    }
}
