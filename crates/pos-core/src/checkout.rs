//! # Checkout Preconditions
//!
//! Turns a tender request and a cart snapshot into a [`CheckoutPlan`]: every
//! field validated, every amount checked, ready to be committed by the
//! database layer. Nothing here touches storage, so a request that fails any
//! precondition never opens a transaction.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CheckoutRequest + CartSnapshot                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CheckoutPlan::prepare ◄── THIS MODULE (pure)                          │
//! │    ├── cart empty?                    → EmptyCart                       │
//! │    ├── payment_method blank?          → Validation                      │
//! │    ├── date not YYYY-MM-DD?           → Validation                      │
//! │    ├── amount_paid / change negative? → Validation                      │
//! │    ├── amount_paid < total?           → PaymentMismatch                 │
//! │    └── |change - (paid - total)| > 0.01 → PaymentMismatch               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  CheckoutRepository::commit (pos-db, one transaction)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{CartLineItem, CartSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::{
    validate_customer_name, validate_non_negative, validate_payment_method, validate_sale_date,
};
use crate::CHANGE_TOLERANCE_CENTS;

/// Tender details sent by the cashier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub payment_method: String,
    /// Sale date, `YYYY-MM-DD`.
    pub date: String,
    #[ts(as = "String")]
    pub amount_paid: Money,
    #[ts(as = "String")]
    pub change_given: Money,
}

/// A validated checkout, ready to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    /// Shared by every sale row this checkout writes.
    pub batch_id: String,
    pub customer_name: String,
    pub payment_method: String,
    pub date: NaiveDate,
    pub amount_paid: Money,
    pub change_given: Money,
    pub total: Money,
    pub lines: Vec<CartLineItem>,
}

impl CheckoutPlan {
    /// Checks every precondition of a checkout against the cart snapshot.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::{CartSnapshot, CheckoutPlan, CheckoutRequest, CoreError, Money};
    ///
    /// let empty = CartSnapshot { items: vec![], total: Money::zero() };
    /// let request = CheckoutRequest {
    ///     customer_name: None,
    ///     payment_method: "Cash".into(),
    ///     date: "2024-05-01".into(),
    ///     amount_paid: Money::zero(),
    ///     change_given: Money::zero(),
    /// };
    ///
    /// assert!(matches!(
    ///     CheckoutPlan::prepare(&request, &empty),
    ///     Err(CoreError::EmptyCart)
    /// ));
    /// ```
    pub fn prepare(request: &CheckoutRequest, cart: &CartSnapshot) -> CoreResult<CheckoutPlan> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let customer_name = validate_customer_name(request.customer_name.as_deref())?;
        let payment_method = validate_payment_method(&request.payment_method)?;
        let date = validate_sale_date(&request.date)?;
        validate_non_negative("amount_paid", request.amount_paid)?;
        validate_non_negative("change_given", request.change_given)?;

        let total: Money = cart.items.iter().map(|l| l.subtotal).sum();

        if request.amount_paid < total {
            return Err(CoreError::PaymentMismatch {
                reason: format!(
                    "amount paid {} is less than total {}",
                    request.amount_paid, total
                ),
            });
        }

        let expected_change = request.amount_paid - total;
        if (request.change_given - expected_change).abs().cents() > CHANGE_TOLERANCE_CENTS {
            return Err(CoreError::PaymentMismatch {
                reason: format!(
                    "change given {} does not match expected change {}",
                    request.change_given, expected_change
                ),
            });
        }

        Ok(CheckoutPlan {
            batch_id: Uuid::new_v4().to_string(),
            customer_name,
            payment_method,
            date,
            amount_paid: request.amount_paid,
            change_given: request.change_given,
            total,
            lines: cart.items.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
