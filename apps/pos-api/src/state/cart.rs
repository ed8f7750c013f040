//! # Cart Store
//!
//! Session-keyed carts behind a trait so routes never touch a concrete map.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Route                    CartStore call          Cart change           │
//! │  ─────                    ──────────────          ───────────           │
//! │                                                                         │
//! │  add_to_cart ───────────► add(session, p, qty) ─► merge or push line    │
//! │                                                                         │
//! │  remove_from_cart ──────► remove(session, i) ───► items.remove(i)       │
//! │                                                                         │
//! │  get_cart ──────────────► snapshot(session) ────► (read only)           │
//! │                                                                         │
//! │  checkout (begins) ─────► take(session) ────────► cart detached         │
//! │                                                                         │
//! │  checkout (fails) ──────► restore(session, s) ──► lines put back        │
//! │                                                                         │
//! │  NOTE: Writes take the map lock exclusively. Reads share it.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::session::SessionId;
use pos_core::{Cart, CartSnapshot, CoreResult, Product};

/// Holds one cart per session.
///
/// Implementations must be safe to share between request tasks. A store with
/// no cart for a session behaves as if that session had an empty cart.
pub trait CartStore: Send + Sync {
    /// Current cart contents.
    fn snapshot(&self, session: SessionId) -> CartSnapshot;

    /// Units of a product already in the session's cart.
    fn quantity_in_cart(&self, session: SessionId, product_id: i64, store_id: i64) -> i64;

    /// Adds `quantity` of `product`, merging with an existing line.
    fn add(&self, session: SessionId, product: &Product, quantity: i64) -> CoreResult<CartSnapshot>;

    /// Removes the line at `index`.
    fn remove(&self, session: SessionId, index: usize) -> CoreResult<CartSnapshot>;

    /// Detaches the session's cart and returns its contents.
    ///
    /// The cart is gone from the store once this returns, so a second
    /// checkout of the same session sees an empty cart. Lines added while a
    /// checkout runs start a new cart.
    fn take(&self, session: SessionId) -> CartSnapshot;

    /// Puts a detached cart back after its checkout failed, ahead of any
    /// lines added since.
    fn restore(&self, session: SessionId, detached: &CartSnapshot);
}

/// Process-local cart store.
///
/// Carts are lost on restart, like the browser session they stand in for.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<SessionId, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        InMemoryCartStore::default()
    }

    /// Number of sessions holding a cart.
    pub fn session_count(&self) -> usize {
        self.carts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn with_cart<F, R>(&self, session: SessionId, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        // Cart mutations cannot leave a cart half-written, so a poisoned lock
        // still guards consistent data
        let mut carts = self.carts.write().unwrap_or_else(PoisonError::into_inner);
        let cart = carts.entry(session).or_default();
        let result = f(cart);
        if cart.is_empty() {
            carts.remove(&session);
        }
        result
    }
}

impl CartStore for InMemoryCartStore {
    fn snapshot(&self, session: SessionId) -> CartSnapshot {
        let carts = self.carts.read().unwrap_or_else(PoisonError::into_inner);
        match carts.get(&session) {
            Some(cart) => cart.snapshot(),
            None => Cart::new().snapshot(),
        }
    }

    fn quantity_in_cart(&self, session: SessionId, product_id: i64, store_id: i64) -> i64 {
        let carts = self.carts.read().unwrap_or_else(PoisonError::into_inner);
        carts
            .get(&session)
            .map(|cart| cart.quantity_of(product_id, store_id))
            .unwrap_or(0)
    }

    fn add(&self, session: SessionId, product: &Product, quantity: i64) -> CoreResult<CartSnapshot> {
        self.with_cart(session, |cart| {
            cart.add(product, quantity)?;
            debug!(%session, product_id = product.id, quantity, lines = cart.len(), "Cart line added");
            Ok(cart.snapshot())
        })
    }

    fn remove(&self, session: SessionId, index: usize) -> CoreResult<CartSnapshot> {
        self.with_cart(session, |cart| {
            let removed = cart.remove(index)?;
            debug!(%session, product_id = removed.product_id, index, "Cart line removed");
            Ok(cart.snapshot())
        })
    }

    fn take(&self, session: SessionId) -> CartSnapshot {
        let mut carts = self.carts.write().unwrap_or_else(PoisonError::into_inner);
        match carts.remove(&session) {
            Some(cart) => {
                debug!(%session, lines = cart.len(), "Cart detached for checkout");
                cart.snapshot()
            }
            None => Cart::new().snapshot(),
        }
    }

    fn restore(&self, session: SessionId, detached: &CartSnapshot) {
        if detached.is_empty() {
            return;
        }
        self.with_cart(session, |cart| {
            cart.restore(detached);
            debug!(%session, lines = cart.len(), "Cart restored");
        })
    }
}
