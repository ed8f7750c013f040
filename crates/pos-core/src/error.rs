//! # Error Types
//!
//! Domain-specific error types for pos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pos-core errors (this file)                                           │
//! │  ├── CoreError        - Domain errors (stock, payment, cart index)     │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── TokenError       - Tampered or malformed id tokens (token.rs)     │
//! │                                                                         │
//! │  pos-db errors (separate crate)                                        │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── CheckoutError    - Core | Db, for the checkout transaction        │
//! │                                                                         │
//! │  pos-api errors (in app)                                               │
//! │  └── ApiError         - What the client sees ({success:false, ...})    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::token::TokenError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Unlike database faults
/// they are safe to show to the cashier verbatim.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the requested store.
    ///
    /// ## When This Occurs
    /// - Product id doesn't exist
    /// - Barcode doesn't match any product of the store
    /// - Product belongs to a different store than the one requested
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is flagged out of stock and cannot be added.
    #[error("{name} is out of stock")]
    ProductUnavailable { product_id: i64, name: String },

    /// Insufficient stock to complete the sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (2 x Milk)
    ///      │
    ///      ▼
    /// Live stock read inside the transaction: available=1
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Milk", available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// Whole checkout rolled back, cashier sees "Only 1 Milk in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Cart line index does not exist.
    #[error("Cart item {index} not found (cart has {len} items)")]
    CartIndexOutOfRange { index: usize, len: usize },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Merged line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Amount paid or change given is inconsistent with the cart total.
    ///
    /// ## When This Occurs
    /// - `amount_paid < total`
    /// - `change_given` differs from `amount_paid - total` by more than a cent
    #[error("Payment mismatch: {reason}")]
    PaymentMismatch { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Token could not be decoded.
    #[error(transparent)]
    Token(#[from] TokenError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any I/O runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 1,
            name: "Milk 1L".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Milk 1L: available 1, requested 2"
        );

        let err = CoreError::CartIndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Cart item 4 not found (cart has 2 items)");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "payment_method".to_string(),
        };
        assert_eq!(err.to_string(), "payment_method is required");

        let err = ValidationError::MustNotBeNegative {
            field: "amount_paid".to_string(),
        };
        assert_eq!(err.to_string(), "amount_paid must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "date".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
