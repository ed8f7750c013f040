//! # API Error Type
//!
//! Unified error type for every route.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mall POS                               │
//! │                                                                         │
//! │  Route handler: Result<Json<T>, ApiError>                               │
//! │         │                                                               │
//! │         ├── ValidationError ──────────────────► 400 VALIDATION_ERROR    │
//! │         ├── TokenError ───────────────────────► 400 INVALID_TOKEN       │
//! │         ├── ProductNotFound / SaleNotFound ───► 404 NOT_FOUND           │
//! │         ├── InsufficientStock ────────────────► 409 INSUFFICIENT_STOCK  │
//! │         ├── PaymentMismatch ──────────────────► 422 PAYMENT_MISMATCH    │
//! │         ├── DbError::Busy ────────────────────► 503 DATABASE_BUSY       │
//! │         └── other DbError ── error!(detail) ──► 500 DATABASE_ERROR      │
//! │                                                                         │
//! │  Body: { "success": false, "code": "...", "message": "..." }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock and payment problems are reported precisely since the cashier can act
//! on them. Database faults are logged in full and answered with a generic
//! message so the schema never leaks to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use pos_core::{CoreError, TokenError, ValidationError};
use pos_db::{CheckoutError, DbError};

/// API error returned from every route.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "success": false,
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Milk 1L: available 1, requested 2"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Id token was tampered with or malformed (400)
    InvalidToken,

    /// Resource not found (404)
    NotFound,

    /// Live stock is short (409)
    InsufficientStock,

    /// Amount paid or change given is inconsistent with the total (422)
    PaymentMismatch,

    /// Write lock could not be taken in time (503)
    DatabaseBusy,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::InvalidToken => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PaymentMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseBusy => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: &self.message,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::Validation(e) => e.into(),
            DbError::CheckViolation { message } => {
                error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Busy => {
                warn!("Database busy, request rejected");
                ApiError::new(ErrorCode::DatabaseBusy, "Database is busy, please retry")
            }
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseBusy, "Database is busy, please retry")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(reference) => ApiError::not_found("Product", &reference),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            e @ CoreError::ProductUnavailable { .. } => {
                ApiError::new(ErrorCode::NotFound, e.to_string())
            }
            e @ CoreError::CartIndexOutOfRange { .. } => {
                ApiError::new(ErrorCode::NotFound, e.to_string())
            }
            e @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ CoreError::PaymentMismatch { .. } => {
                ApiError::new(ErrorCode::PaymentMismatch, e.to_string())
            }
            e @ (CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }) => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => e.into(),
            CoreError::Token(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        if err == TokenError::Encryption {
            error!("Id token encryption failed");
            return ApiError::internal("Could not issue link");
        }
        // Detail stays in the log; the client only learns the link is bad
        warn!(error = %err, "Rejected id token");
        ApiError::new(ErrorCode::InvalidToken, "Invalid or tampered link")
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Core(e) => e.into(),
            CheckoutError::Db(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_precise() {
        let err: ApiError = CoreError::InsufficientStock {
            product_id: 1,
            name: "Milk 1L".to_string(),
            available: 1,
            requested: 2,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
        assert!(err.message.contains("available 1"));

        let err: ApiError = CoreError::PaymentMismatch {
            reason: "amount paid 10.00 is less than total 15.00".to_string(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("15.00"));
    }

    #[test]
    fn test_database_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("no such column: price_cents".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("price_cents"));

        let err: ApiError = CheckoutError::Db(DbError::Busy).into();
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_rejected_row_is_validation_error() {
        let err: ApiError = DbError::Validation(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("tax_rate"));
    }

    #[test]
    fn test_token_errors_hide_detail() {
        let err: ApiError = CoreError::Token(TokenError::Decryption).into();
        assert_eq!(err.code, ErrorCode::InvalidToken);
        assert_eq!(err.message, "Invalid or tampered link");
    }

    #[test]
    fn test_cart_index_maps_to_not_found() {
        let err: ApiError = CoreError::CartIndexOutOfRange { index: 3, len: 1 }.into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
    }
}
