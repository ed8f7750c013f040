//! # pos-core: Pure Business Logic for Mall POS
//!
//! This crate is the **heart** of Mall POS. It contains the cart, checkout
//! preconditions, receipt projection and id tokens as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mall POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Cashier Front-end                            │   │
//! │  │    Scan/Search ──► Cart ──► Tender ──► Receipt ──► Sales list   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pos-api (axum)                               │   │
//! │  │    add_to_cart, get_cart, checkout, fetch_sales, delete         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pos-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  money  │ │  cart   │ │ checkout │ │ receipt │ │ token  │  │   │
//! │  │   │  Money  │ │  Cart   │ │  Plan    │ │  View   │ │ Codec  │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pos-db (Database Layer)                      │   │
//! │  │        SQLite queries, migrations, checkout transaction         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, SaleTransaction, StoreSettings, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Session cart with additive merge
//! - [`checkout`] - Checkout preconditions, evaluated before any I/O
//! - [`receipt`] - Projection of committed sales into a printable receipt
//! - [`token`] - Reversible encrypted tokens for integer ids
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use pos_core::money::Money;
//! use pos_core::types::TaxRate;
//!
//! // Parse what the cashier typed, never go through floats
//! let paid = Money::parse_decimal("20.00").unwrap();
//! assert_eq!(paid.cents(), 2000);
//!
//! // Tax included in a committed amount
//! let vat = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(1250));
//! assert_eq!(vat.cents(), 125);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod receipt;
pub mod token;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartSnapshot};
pub use checkout::{CheckoutPlan, CheckoutRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::{project, ReceiptView};
pub use token::{TokenCodec, TokenError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps the checkout transaction short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Stock level at or below which a product is flagged `LowStock`.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Customer name recorded when the cashier leaves the field blank.
pub const DEFAULT_CUSTOMER_NAME: &str = "Guest";

/// Allowed difference between the change handed back and the computed change.
pub const CHANGE_TOLERANCE_CENTS: i64 = 1;

/// Sales listing page size when the client does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound on the sales listing page size; larger requests are clamped.
pub const MAX_PAGE_SIZE: i64 = 100;
