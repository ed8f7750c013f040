//! # Domain Types
//!
//! Core domain types used throughout Mall POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    Product      │   │   SaleTransaction    │   │  StoreSettings  │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  id (i64)       │   │  id (i64)            │   │  currency_symbol│  │
//! │  │  store_id       │   │  batch_id (UUID)     │   │  receipt_header │  │
//! │  │  price (Money)  │   │  amount (Money)      │   │  receipt_footer │  │
//! │  │  stock ≥ 0      │   │  status              │   │  ...            │  │
//! │  └─────────────────┘   └──────────────────────┘   └─────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │   SaleStatus    │   │  ProductStatus  │       │
//! │  │  bps (u32)      │   │  Completed      │   │  In Stock       │       │
//! │  │  1250 = 12.5%   │   │  Pending        │   │  Low Stock      │       │
//! │  └─────────────────┘   │  Cancelled      │   │  Out of Stock   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Integer Identity
//! Products and sales keep the integer ids the store has always used. Those
//! ids never leave the server in admin links; see [`crate::token`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1250 bps = 12.5% (e.g., standard VAT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Human-readable percentage, e.g. `12.5%`. Display only.
    pub fn percentage_label(&self) -> String {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        match frac {
            0 => format!("{}%", whole),
            f if f % 10 == 0 => format!("{}.{}%", whole, f / 10),
            f => format!("{}.{:02}%", whole, f),
        }
    }
}

/// A named tax row from `tax_rates`, e.g. `("VAT", 12.5%)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NamedTaxRate {
    pub name: String,
    pub rate: TaxRate,
}

// =============================================================================
// Product
// =============================================================================

/// Stock flag shown next to a product.
///
/// Stored as the literal labels the back office uses (`"In Stock"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum ProductStatus {
    #[serde(rename = "In Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Stock"))]
    InStock,
    #[serde(rename = "Low Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Low Stock"))]
    LowStock,
    #[serde(rename = "Out of Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Out of Stock"))]
    OutOfStock,
}

impl ProductStatus {
    /// Derives the flag from a stock level after a sale.
    ///
    /// ```rust
    /// use pos_core::types::ProductStatus;
    ///
    /// assert_eq!(ProductStatus::from_stock(0), ProductStatus::OutOfStock);
    /// assert_eq!(ProductStatus::from_stock(10), ProductStatus::LowStock);
    /// assert_eq!(ProductStatus::from_stock(11), ProductStatus::InStock);
    /// ```
    pub fn from_stock(stock: i64) -> Self {
        if stock <= 0 {
            ProductStatus::OutOfStock
        } else if stock <= LOW_STOCK_THRESHOLD {
            ProductStatus::LowStock
        } else {
            ProductStatus::InStock
        }
    }
}

/// A product available for sale in one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Store this product belongs to. Products are never shared across stores.
    pub store_id: i64,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Current shelf price.
    #[ts(as = "String")]
    pub price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub status: ProductStatus,

    pub barcode: Option<String>,
}

impl Product {
    /// Whether the back office has flagged this product as unsellable.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.status == ProductStatus::OutOfStock
    }
}

/// How the cashier identified the product being added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Id(i64),
    Barcode(String),
}

impl std::fmt::Display for ProductRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductRef::Id(id) => write!(f, "#{}", id),
            ProductRef::Barcode(code) => write!(f, "barcode {}", code),
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale row.
///
/// Checkout only ever writes `Completed`; the other states exist for rows
/// entered by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "PascalCase"))]
#[ts(export)]
pub enum SaleStatus {
    Completed,
    Pending,
    Cancelled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 3] = [
        SaleStatus::Completed,
        SaleStatus::Pending,
        SaleStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "Completed",
            SaleStatus::Pending => "Pending",
            SaleStatus::Cancelled => "Cancelled",
        }
    }

    /// Parses a status filter, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        SaleStatus::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// One persisted sale line. Immutable once written.
///
/// Every line committed by one checkout shares the same `batch_id`, which is
/// how receipts are reassembled later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTransaction {
    pub id: i64,
    pub batch_id: String,
    pub store_id: i64,
    pub store_name: Option<String>,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub customer_name: String,
    pub quantity: i64,
    /// Line amount (quantity × unit price at checkout).
    #[ts(as = "String")]
    pub amount: Money,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub payment_method: String,
    pub status: SaleStatus,
    #[ts(as = "String")]
    pub amount_paid: Money,
    #[ts(as = "String")]
    pub change_given: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Stock figure read back after a checkout decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdatedStock {
    pub id: i64,
    pub stock: i64,
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Store-wide presentation settings, loaded from the `settings` table once per
/// request. Missing keys fall back to [`StoreSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreSettings {
    pub store_name: String,
    pub address: String,
    pub contact: String,
    /// Display prefix only; amounts are never converted between currencies.
    pub currency_symbol: String,
    pub receipt_header: String,
    pub receipt_footer: String,
    /// Paper width in millimetres.
    pub receipt_width: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            store_name: "Mall Supermarket POS".to_string(),
            address: "123 Market St, Cityville".to_string(),
            contact: "(123) 456-7890".to_string(),
            currency_symbol: "GHS".to_string(),
            receipt_header: "Mall Supermarket POS".to_string(),
            receipt_footer: "Thank you for shopping at our mall!".to_string(),
            receipt_width: 80,
        }
    }
}

impl StoreSettings {
    /// Formats an amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    /// use pos_core::types::StoreSettings;
    ///
    /// let settings = StoreSettings::default();
    /// assert_eq!(settings.format_currency(Money::from_cents(1234)), "GHS12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_label() {
        assert_eq!(TaxRate::from_bps(1250).percentage_label(), "12.5%");
        assert_eq!(TaxRate::from_bps(250).percentage_label(), "2.5%");
        assert_eq!(TaxRate::from_bps(1500).percentage_label(), "15%");
        assert_eq!(TaxRate::from_bps(825).percentage_label(), "8.25%");
    }

    #[test]
    fn test_product_status_from_stock() {
        assert_eq!(ProductStatus::from_stock(0), ProductStatus::OutOfStock);
        assert_eq!(ProductStatus::from_stock(1), ProductStatus::LowStock);
        assert_eq!(ProductStatus::from_stock(LOW_STOCK_THRESHOLD), ProductStatus::LowStock);
        assert_eq!(ProductStatus::from_stock(500), ProductStatus::InStock);
    }

    #[test]
    fn test_product_status_serializes_as_label() {
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
    }

    #[test]
    fn test_sale_status_parse() {
        assert_eq!(SaleStatus::parse("completed"), Some(SaleStatus::Completed));
        assert_eq!(SaleStatus::parse(" Pending "), Some(SaleStatus::Pending));
        assert_eq!(SaleStatus::parse("refunded"), None);
    }

    #[test]
    fn test_settings_format_currency() {
        let settings = StoreSettings {
            currency_symbol: "$".to_string(),
            ..StoreSettings::default()
        };
        assert_eq!(settings.format_currency(Money::from_cents(100)), "$1.00");
        assert_eq!(settings.format_currency(Money::from_cents(-1234)), "-$12.34");
    }
}
