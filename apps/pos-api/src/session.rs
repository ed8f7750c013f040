//! # Session Context
//!
//! Every cart-bearing request names its cart with an `x-session-id` header.
//! The id is resolved against the injected [`CartStore`](crate::state::CartStore);
//! nothing about the cart lives in ambient state.
//!
//! ```text
//! POST /api/add_to_cart
//! x-session-id: 4f1c2b7e-...   ──► SessionId(Uuid) ──► carts.add(session, ...)
//! ```

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;
use pos_core::validation::validate_uuid;

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Identifies one cashier session's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        SessionId::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| ApiError::validation(format!("{} header is required", SESSION_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::validation(format!("{} header is not valid text", SESSION_HEADER)))?;

        let id = validate_uuid(raw)?;
        Ok(SessionId(id))
    }
}
