//! # Validation Module
//!
//! Input validation utilities for Mall POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  ├── JSON / query deserialization                                      │
//! │  └── Money parsed from decimal strings into cents                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rule validation                                          │
//! │  └── Runs before any database access                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pos_core::validation::{validate_quantity, validate_sale_date};
//!
//! validate_quantity(5).unwrap();
//! let date = validate_sale_date("2024-05-01").unwrap();
//! assert_eq!(date.to_string(), "2024-05-01");
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{DEFAULT_CUSTOMER_NAME, MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes the customer name recorded on a sale.
///
/// ## Rules
/// - Blank or missing becomes `"Guest"`
/// - At most 100 characters
pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<String> {
    let name = name.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Ok(DEFAULT_CUSTOMER_NAME.to_string());
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 100,
        });
    }

    Ok(name.to_string())
}

/// Validates the payment method label (e.g. `"Cash"`, `"Card"`, `"MoMo"`).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
///
/// ## Returns
/// The trimmed label.
pub fn validate_payment_method(method: &str) -> ValidationResult<String> {
    let method = method.trim();

    if method.is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    if method.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "payment_method".to_string(),
            max: 50,
        });
    }

    Ok(method.to_string())
}

/// Validates a barcode typed or scanned at the till.
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    Ok(barcode.to_string())
}

/// Validates a sale date in `YYYY-MM-DD` form.
///
/// ## Rules
/// - Exactly ten characters, dashes at positions 4 and 7
/// - Must be a real calendar date (no `2024-02-30`)
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_sale_date;
///
/// assert!(validate_sale_date("2024-02-29").is_ok());
/// assert!(validate_sale_date("2023-02-29").is_err());
/// assert!(validate_sale_date("01/05/2024").is_err());
/// assert!(validate_sale_date("2024-5-1").is_err());
/// ```
pub fn validate_sale_date(date: &str) -> ValidationResult<NaiveDate> {
    validate_date_field("date", date)
}

/// Same rules as [`validate_sale_date`], reported against a custom field name.
pub fn validate_date_field(field: &str, date: &str) -> ValidationResult<NaiveDate> {
    let date = date.trim();

    if date.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let bytes = date.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shape_ok {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        });
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "not a calendar date".to_string(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Item                                                         │
/// │                                                                         │
/// │  Cashier enters quantity: 5                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Proceed with add_to_cart                                │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // 10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Rejects negative money amounts (`amount_paid`, `change_given`).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates an id coming from a request body or path (`product_id`, `store_id`).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Pagination
// =============================================================================

/// A validated page request for the sales listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page, at most MAX_PAGE_SIZE.
    pub page_size: i64,
}

impl PageRequest {
    /// Row offset of the first row on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total_rows` rows (ceiling division).
    pub fn total_pages(&self, total_rows: i64) -> i64 {
        if total_rows <= 0 {
            return 0;
        }
        (total_rows + self.page_size - 1) / self.page_size
    }
}

/// Validates pagination parameters.
///
/// ## Rules
/// - `page` and `page_size` must both be at least 1
/// - `page_size` above MAX_PAGE_SIZE (100) is clamped, not rejected
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_page;
///
/// let page = validate_page(2, 500).unwrap();
/// assert_eq!(page.page_size, 100);
/// assert_eq!(page.offset(), 100);
/// assert!(validate_page(0, 10).is_err());
/// ```
pub fn validate_page(page: i64, page_size: i64) -> ValidationResult<PageRequest> {
    if page < 1 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if page_size < 1 {
        return Err(ValidationError::MustBePositive {
            field: "rows_per_page".to_string(),
        });
    }

    Ok(PageRequest {
        page,
        page_size: page_size.min(MAX_PAGE_SIZE),
    })
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of distinct lines) before a new line is added.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string (session ids, checkout batch ids).
///
/// ## Example
/// ```rust
/// use pos_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<uuid::Uuid> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
