//! # State Module
//!
//! Shared state handed to every route through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌────────────────────┐  ┌──────────────────┐         │
//! │  │   Database   │  │  Arc<dyn CartStore>│  │ Arc<TokenCodec>  │         │
//! │  │              │  │                    │  │                  │         │
//! │  │  SQLite pool │  │  carts keyed by    │  │  key derived     │         │
//! │  │  (pos-db)    │  │  SessionId         │  │  from the secret │         │
//! │  └──────────────┘  └────────────────────┘  └──────────────────┘         │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool, cheap to clone                  │
//! │  • CartStore: implementations lock internally                          │
//! │  • TokenCodec: read-only after construction                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

use std::sync::Arc;

pub use cart::{CartStore, InMemoryCartStore};

use pos_core::TokenCodec;
use pos_db::Database;

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub carts: Arc<dyn CartStore>,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    /// State with an in-memory cart store.
    pub fn new(db: Database, tokens: TokenCodec) -> Self {
        AppState::with_cart_store(db, tokens, Arc::new(InMemoryCartStore::new()))
    }

    /// State with a caller-supplied cart store.
    pub fn with_cart_store(db: Database, tokens: TokenCodec, carts: Arc<dyn CartStore>) -> Self {
        AppState {
            db,
            carts,
            tokens: Arc::new(tokens),
        }
    }
}
