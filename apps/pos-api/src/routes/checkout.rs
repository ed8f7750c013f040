//! # Checkout & Command Routes
//!
//! Both routes read the tagged commands below. `POST /api/checkout` accepts
//! only `"action": "checkout"`; `POST /api/pos` takes any of them, so a
//! single endpoint can drive the till:
//!
//! ```json
//! { "action": "add",      "barcode": "6001000000011", "quantity": 2, "store_id": 1 }
//! { "action": "remove",   "index": 0 }
//! { "action": "checkout", "payment_method": "Cash", "date": "2024-05-01",
//!   "amount_paid": "20.00", "change_given": "0.00" }
//! ```
//!
//! A missing or unknown `action` is a deserialization error, answered with
//! `VALIDATION_ERROR`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::cart::{add_item, remove_item, AddToCartRequest, RemoveFromCartRequest};
use crate::checkout::{checkout as run_checkout, CheckoutResponse};
use crate::error::ApiError;
use crate::session::SessionId;
use crate::state::AppState;
use pos_core::{CheckoutRequest, ValidationError};

/// A till command.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PosCommand {
    Add(AddToCartRequest),
    Remove(RemoveFromCartRequest),
    Checkout(CheckoutRequest),
}

impl PosCommand {
    fn into_checkout(self) -> Result<CheckoutRequest, ValidationError> {
        match self {
            PosCommand::Checkout(request) => Ok(request),
            PosCommand::Add(_) | PosCommand::Remove(_) => Err(ValidationError::NotAllowed {
                field: "action".to_string(),
                allowed: vec!["checkout".to_string()],
            }),
        }
    }
}

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<PosCommand>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Json(command) = payload?;
    let request = command.into_checkout()?;
    run_checkout(&state, session, &request).await.map(Json)
}

/// POST /api/pos
pub async fn dispatch(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<PosCommand>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(command) = payload?;

    let response = match command {
        PosCommand::Add(request) => Json(add_item(&state, session, &request).await?).into_response(),
        PosCommand::Remove(request) => Json(remove_item(&state, session, &request)?).into_response(),
        PosCommand::Checkout(request) => {
            Json(run_checkout(&state, session, &request).await?).into_response()
        }
    };

    Ok(response)
}
