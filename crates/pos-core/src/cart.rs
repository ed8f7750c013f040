//! # Cart
//!
//! The cashier's working cart for one session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           HTTP Route               Cart Change          │
//! │  ──────────────           ──────────               ───────────          │
//! │                                                                         │
//! │  Scan / pick product ────► add_to_cart ──────────► merge or push line   │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart ─────► items.remove(i)      │
//! │                                                                         │
//! │  View Cart ──────────────► get_cart ─────────────► snapshot (read only) │
//! │                                                                         │
//! │  Checkout begins ────────► checkout ─────────────► cart detached        │
//! │                                                                         │
//! │  Checkout fails ─────────► checkout ─────────────► restore(detached)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `(product_id, store_id)`; adding again merges
//! - `subtotal == quantity × unit_price` after every mutation
//! - `total == Σ subtotal`, recomputed on every snapshot
//!
//! The cart holds no stock reservation. Stock is checked for real inside the
//! checkout transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_cart_size, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    pub product_id: i64,
    pub store_id: i64,
    pub name: String,
    pub quantity: i64,
    /// Shelf price at the last add of this product.
    #[ts(as = "String")]
    pub unit_price: Money,
    #[ts(as = "String")]
    pub subtotal: Money,
    /// Stock seen at the last add. Advisory only.
    pub stock_snapshot: i64,
}

impl CartLineItem {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLineItem {
            product_id: product.id,
            store_id: product.store_id,
            name: product.name.clone(),
            quantity,
            unit_price: product.price,
            subtotal: product.price.multiply_quantity(quantity),
            stock_snapshot: product.stock,
        }
    }

    fn recompute_subtotal(&mut self) {
        self.subtotal = self.unit_price.multiply_quantity(self.quantity);
    }
}

/// Read-only view of a cart handed to routes and the checkout path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    #[ts(as = "String")]
    pub total: Money,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A session cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` of `product`, merging with an existing line.
    ///
    /// ## Behavior
    /// - Product flagged out of stock: rejected with `ProductUnavailable`
    /// - Product already in cart: quantity increased, unit price refreshed to
    ///   the current shelf price, subtotal recomputed
    /// - Otherwise a new line is appended
    ///
    /// Stock is not checked here; callers run the advisory stock check on
    /// [`Cart::quantity_of`] + `quantity` before calling this.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::{Cart, Money, Product, ProductStatus};
    ///
    /// let milk = Product {
    ///     id: 1,
    ///     store_id: 1,
    ///     name: "Milk".into(),
    ///     price: Money::from_cents(1000),
    ///     stock: 5,
    ///     status: ProductStatus::LowStock,
    ///     barcode: None,
    /// };
    ///
    /// let mut cart = Cart::new();
    /// cart.add(&milk, 2).unwrap();
    /// cart.add(&milk, 1).unwrap();
    ///
    /// let snapshot = cart.snapshot();
    /// assert_eq!(snapshot.items.len(), 1);
    /// assert_eq!(snapshot.items[0].quantity, 3);
    /// assert_eq!(snapshot.total.cents(), 3000);
    /// ```
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if product.is_out_of_stock() {
            return Err(CoreError::ProductUnavailable {
                product_id: product.id,
                name: product.name.clone(),
            });
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product.id && l.store_id == product.store_id)
        {
            let merged = line.quantity + quantity;
            if merged > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: merged,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = merged;
            line.unit_price = product.price;
            line.name = product.name.clone();
            line.stock_snapshot = product.stock;
            line.recompute_subtotal();
            return Ok(());
        }

        if validate_cart_size(self.items.len()).is_err() {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartLineItem::from_product(product, quantity));
        Ok(())
    }

    /// Quantity of a product already in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: i64, store_id: i64) -> i64 {
        self.items
            .iter()
            .find(|l| l.product_id == product_id && l.store_id == store_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Removes the line at `index`. Later lines shift down, no gaps.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLineItem> {
        if index >= self.items.len() {
            return Err(CoreError::CartIndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Puts lines detached for a failed checkout back in front of anything
    /// added since.
    ///
    /// A line added in the meantime for the same product merges into the
    /// restored one and brings its newer shelf price with it, as
    /// [`Cart::add`] would.
    pub fn restore(&mut self, detached: &CartSnapshot) {
        let added = std::mem::replace(&mut self.items, detached.items.clone());

        for line in added {
            match self
                .items
                .iter_mut()
                .find(|l| l.product_id == line.product_id && l.store_id == line.store_id)
            {
                Some(existing) => {
                    existing.quantity += line.quantity;
                    existing.unit_price = line.unit_price;
                    existing.name = line.name;
                    existing.stock_snapshot = line.stock_snapshot;
                    existing.recompute_subtotal();
                }
                None => self.items.push(line),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Current total, always recomputed from line subtotals.
    pub fn total(&self) -> Money {
        self.items.iter().map(|l| l.subtotal).sum()
    }

    /// Copies the cart out for display or checkout.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total: self.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
