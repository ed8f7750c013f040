//! # Settings Repository
//!
//! Store presentation settings and named tax rates.
//!
//! Settings are key/value rows. Keys that are missing, or whose value does not
//! parse, keep the value from [`StoreSettings::default`].
//!
//! | key               | field                          |
//! |-------------------|--------------------------------|
//! | `store_name`      | [`StoreSettings::store_name`]      |
//! | `address`         | [`StoreSettings::address`]         |
//! | `contact`         | [`StoreSettings::contact`]         |
//! | `currency_symbol` | [`StoreSettings::currency_symbol`] |
//! | `receipt_header`  | [`StoreSettings::receipt_header`]  |
//! | `receipt_footer`  | [`StoreSettings::receipt_footer`]  |
//! | `receipt_width`   | [`StoreSettings::receipt_width`]   |

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use pos_core::validation::validate_tax_rate_bps;
use pos_core::{NamedTaxRate, StoreSettings, TaxRate};

/// Repository for settings and tax rates.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads store settings, falling back to defaults per key.
    pub async fn load(&self) -> DbResult<StoreSettings> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = StoreSettings::default();
        for (key, value) in rows {
            match key.as_str() {
                "store_name" => settings.store_name = value,
                "address" => settings.address = value,
                "contact" => settings.contact = value,
                "currency_symbol" => settings.currency_symbol = value,
                "receipt_header" => settings.receipt_header = value,
                "receipt_footer" => settings.receipt_footer = value,
                "receipt_width" => match value.trim().parse::<u32>() {
                    Ok(width) => settings.receipt_width = width,
                    Err(_) => warn!(value = %value, "Ignoring unparsable receipt_width"),
                },
                other => debug!(key = other, "Ignoring unknown setting"),
            }
        }

        Ok(settings)
    }

    /// Inserts or replaces one setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key, "Setting saved");
        Ok(())
    }

    /// All named tax rates, in insertion order.
    pub async fn tax_rates(&self) -> DbResult<Vec<NamedTaxRate>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, rate_bps FROM tax_rates ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(name, bps)| NamedTaxRate {
                name,
                // CHECK constraint keeps rate_bps within 0..=10000
                rate: TaxRate::from_bps(bps.clamp(0, 10_000) as u32),
            })
            .collect())
    }

    /// Adds a named tax rate.
    pub async fn add_tax_rate(&self, name: &str, rate: TaxRate) -> DbResult<()> {
        validate_tax_rate_bps(rate.bps())?;

        sqlx::query("INSERT INTO tax_rates (name, rate_bps) VALUES (?1, ?2)")
            .bind(name.trim())
            .bind(rate.bps() as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
