//! # Cart Routes
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Tender  │────►│ Committed│       │
//! │  │  Cart    │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout                          │
//! │                   remove_from_cart   (checkout.rs)                     │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   get_cart                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding runs an advisory stock check against the quantity the line will
//! hold after merging. The authoritative check happens again at checkout.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::session::SessionId;
use crate::state::AppState;
use pos_core::validation::{validate_barcode, validate_id, validate_quantity};
use pos_core::{CartLineItem, CartSnapshot, CoreError, Money, ProductRef, ValidationError};
use pos_db::check_stock;

/// Body of `add_to_cart`. One of `product_id` or `barcode` is required;
/// `product_id` wins when both are sent.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub store_id: i64,
}

fn default_quantity() -> i64 {
    1
}

impl AddToCartRequest {
    fn product_ref(&self) -> Result<ProductRef, ValidationError> {
        if let Some(id) = self.product_id {
            validate_id("product_id", id)?;
            return Ok(ProductRef::Id(id));
        }
        match self.barcode.as_deref() {
            Some(barcode) => Ok(ProductRef::Barcode(validate_barcode(barcode)?)),
            None => Err(ValidationError::Required {
                field: "product_id or barcode".to_string(),
            }),
        }
    }
}

/// Body of `remove_from_cart`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveFromCartRequest {
    pub index: usize,
}

/// Cart contents as the client sees them.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub cart: Vec<CartLineItem>,
    pub cart_total: Money,
}

impl CartResponse {
    fn new(snapshot: CartSnapshot, message: Option<String>) -> Self {
        CartResponse {
            success: true,
            message,
            cart: snapshot.items,
            cart_total: snapshot.total,
        }
    }
}

/// Adds a product to the session's cart.
pub(crate) async fn add_item(
    state: &AppState,
    session: SessionId,
    request: &AddToCartRequest,
) -> Result<CartResponse, ApiError> {
    validate_id("store_id", request.store_id)?;
    validate_quantity(request.quantity)?;
    let product_ref = request.product_ref()?;

    debug!(%session, product = %product_ref, store_id = request.store_id, quantity = request.quantity, "add_to_cart");

    let product = state.db.products().resolve(&product_ref, request.store_id).await?;
    if product.is_out_of_stock() {
        return Err(CoreError::ProductUnavailable {
            product_id: product.id,
            name: product.name,
        }
        .into());
    }

    let merged = state.carts.quantity_in_cart(session, product.id, product.store_id) + request.quantity;
    check_stock(state.db.pool(), product.id, product.store_id, merged).await?;

    let snapshot = state.carts.add(session, &product, request.quantity)?;
    Ok(CartResponse::new(
        snapshot,
        Some(format!("{} added to cart", product.name)),
    ))
}

/// Removes a cart line by index.
pub(crate) fn remove_item(
    state: &AppState,
    session: SessionId,
    request: &RemoveFromCartRequest,
) -> Result<CartResponse, ApiError> {
    debug!(%session, index = request.index, "remove_from_cart");
    let snapshot = state.carts.remove(session, request.index)?;
    Ok(CartResponse::new(snapshot, Some("Item removed from cart".to_string())))
}

/// POST /api/add_to_cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(request) = payload?;
    add_item(&state, session, &request).await.map(Json)
}

/// GET /api/get_cart
pub async fn get_cart(State(state): State<AppState>, session: SessionId) -> Json<CartResponse> {
    Json(CartResponse::new(state.carts.snapshot(session), None))
}

/// POST /api/remove_from_cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiError> {
    let Json(request) = payload?;
    remove_item(&state, session, &request).map(Json)
}
