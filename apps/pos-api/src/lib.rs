//! # pos-api: HTTP JSON Server for Mall POS
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        pos-api                                          │
//! │                                                                         │
//! │  main.rs ────► tracing, config, database, serve                        │
//! │                                                                         │
//! │  lib.rs ─────► create_app: routes + TraceLayer + CorsLayer             │
//! │                                                                         │
//! │  routes/ ────► cart, checkout, sales, health                           │
//! │                                                                         │
//! │  checkout.rs ► Checkout Coordinator (cart → plan → commit → receipt)   │
//! │                                                                         │
//! │  state/ ─────► AppState { Database, CartStore, TokenCodec }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ErrorCode};
pub use session::{SessionId, SESSION_HEADER};
pub use state::{AppState, CartStore, InMemoryCartStore};

/// Build the router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/add_to_cart", post(routes::cart::add_to_cart))
        .route("/api/get_cart", get(routes::cart::get_cart))
        .route("/api/remove_from_cart", post(routes::cart::remove_from_cart))
        .route("/api/checkout", post(routes::checkout::checkout))
        .route("/api/pos", post(routes::checkout::dispatch))
        .route("/api/fetch_sales", get(routes::sales::fetch_sales))
        .route("/api/sales/delete/{token}", get(routes::sales::delete_sale))
        .route("/api/receipts/{batch_id}", get(routes::sales::get_receipt))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
