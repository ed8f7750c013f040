//! # Repository Module
//!
//! Database repository implementations for Mall POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP route                                                             │
//! │       │                                                                 │
//! │       │  db.products().resolve(&ProductRef::Barcode(..), store_id)      │
//! │       ▼                                                                 │
//! │  ProductRepository / SaleRepository / SettingsRepository / ...          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  CheckoutRepository is the only one that writes more than one table,   │
//! │  and it does so inside a single BEGIN IMMEDIATE transaction.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product lookup, stock reads, the stock validator
//! - [`sale::SaleRepository`] - Sales listing, batch lookup, delete
//! - [`settings::SettingsRepository`] - Store settings and tax rates
//! - [`store::StoreRepository`] - Stores
//! - [`checkout::CheckoutRepository`] - The checkout transaction

pub mod checkout;
pub mod product;
pub mod sale;
pub mod settings;
pub mod store;
