//! # Checkout Coordinator
//!
//! Turns a session's cart into committed sales.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest + SessionId                                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  carts.take(session)              ← cart detached from the session      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  CheckoutPlan::prepare            ← empty cart, fields, tender          │
//! │        │  (no I/O has happened yet; any failure returns here)           │
//! │        ▼                                                                │
//! │  db.checkout().commit(plan)       ← one BEGIN IMMEDIATE transaction     │
//! │        │                                                                │
//! │        ├── error ──► carts.restore(session, detached)                   │
//! │        ▼                                                                │
//! │  cart stays gone                  ← cleared by COMMIT                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  settings + tax rates ──► receipt::project                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::session::SessionId;
use crate::state::{AppState, CartStore};
use pos_core::{
    receipt, CartSnapshot, CheckoutPlan, CheckoutRequest, ReceiptView, SaleTransaction,
    StoreSettings, UpdatedStock,
};

/// Body of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    pub transactions: Vec<SaleTransaction>,
    pub updated_products: Vec<UpdatedStock>,
    pub receipt: ReceiptView,
}

/// A session's cart while its checkout runs.
///
/// Nothing else can check the same lines out while this is alive. Dropped
/// before [`DetachedCart::committed`], whether the checkout failed or the
/// request was cancelled, it puts the lines back.
struct DetachedCart<'a> {
    carts: &'a dyn CartStore,
    session: SessionId,
    snapshot: CartSnapshot,
    committed: bool,
}

impl<'a> DetachedCart<'a> {
    fn take(carts: &'a dyn CartStore, session: SessionId) -> Self {
        let snapshot = carts.take(session);
        DetachedCart {
            carts,
            session,
            snapshot,
            committed: false,
        }
    }

    fn committed(mut self) {
        self.committed = true;
    }
}

impl Drop for DetachedCart<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.carts.restore(self.session, &self.snapshot);
        }
    }
}

/// Checks out the session's cart.
///
/// ## Errors
/// * `VALIDATION_ERROR` - Empty cart or a bad field
/// * `PAYMENT_MISMATCH` - Underpaid, or change off by more than a cent
/// * `INSUFFICIENT_STOCK` - A line's live stock is short; nothing written
/// * `DATABASE_*` - Storage fault; nothing written
///
/// The cart is detached for the whole checkout, so two requests for one
/// session cannot both commit it. On every error it is put back so the
/// cashier can fix the tender or the lines and retry.
pub async fn checkout(
    state: &AppState,
    session: SessionId,
    request: &CheckoutRequest,
) -> Result<CheckoutResponse, ApiError> {
    let cart = DetachedCart::take(state.carts.as_ref(), session);
    debug!(%session, lines = cart.snapshot.items.len(), total = %cart.snapshot.total, "Checkout requested");

    let plan = CheckoutPlan::prepare(request, &cart.snapshot).map_err(|e| {
        warn!(%session, error = %e, "Checkout rejected");
        ApiError::from(e)
    })?;

    let outcome = state.db.checkout().commit(&plan).await.map_err(|e| {
        warn!(%session, batch_id = %plan.batch_id, error = %e, "Checkout failed");
        ApiError::from(e)
    })?;

    cart.committed();

    info!(
        %session,
        batch_id = %outcome.batch_id,
        lines = outcome.transactions.len(),
        total = %plan.total,
        "Checkout completed"
    );

    // Sale is committed; receipt inputs fall back rather than fail the request
    let settings = match state.db.settings().load().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "Could not load settings for receipt, using defaults");
            StoreSettings::default()
        }
    };
    let tax_rates = match state.db.settings().tax_rates().await {
        Ok(rates) => rates,
        Err(e) => {
            warn!(error = %e, "Could not load tax rates for receipt");
            Vec::new()
        }
    };

    let receipt = receipt::project(&outcome.transactions, &settings, &tax_rates);

    Ok(CheckoutResponse {
        success: true,
        message: "Checkout completed successfully!".to_string(),
        transactions: outcome.transactions,
        updated_products: outcome.updated_products,
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pos_core::{Money, ProductRef, TaxRate, TokenCodec};
    use pos_db::{Database, NewProduct};

    async fn state_with_product(stock: i64) -> (AppState, pos_core::Product) {
        let db = Database::in_memory().await.unwrap();
        let store_id = db.stores().insert("Main").await.unwrap();
        let id = db
            .products()
            .insert(&NewProduct {
                store_id,
                name: "Milk 1L".to_string(),
                price: Money::from_cents(1000),
                stock,
                barcode: None,
            })
            .await
            .unwrap();
        let product = db.products().resolve(&ProductRef::Id(id), store_id).await.unwrap();
        let state = AppState::new(db, TokenCodec::from_secret("checkout-tests-secret-0123456789ab"));
        (state, product)
    }

    fn tender(paid: &str, change: &str) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: Some("Ama".to_string()),
            payment_method: "Cash".to_string(),
            date: "2024-05-01".to_string(),
            amount_paid: Money::parse_decimal(paid).unwrap(),
            change_given: Money::parse_decimal(change).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_and_projects_receipt() {
        let (state, milk) = state_with_product(5).await;
        state
            .db
            .settings()
            .add_tax_rate("VAT", TaxRate::from_bps(1250))
            .await
            .unwrap();
        let session = SessionId::new();
        state.carts.add(session, &milk, 2).unwrap();

        let response = checkout(&state, session, &tender("20.00", "0.00")).await.unwrap();

        assert!(response.success);
        assert_eq!(response.transactions.len(), 1);
        assert_eq!(response.transactions[0].customer_name, "Ama");
        assert_eq!(response.updated_products[0].stock, 3);
        assert_eq!(response.receipt.batches.len(), 1);
        assert_eq!(response.receipt.batches[0].tax_total.cents(), 250);
        assert!(state.carts.snapshot(session).is_empty());
    }

    #[tokio::test]
    async fn test_rejected_checkout_keeps_cart() {
        let (state, milk) = state_with_product(5).await;
        let session = SessionId::new();
        state.carts.add(session, &milk, 2).unwrap();

        let err = checkout(&state, session, &tender("10.00", "0.00")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMismatch);
        assert_eq!(state.carts.snapshot(session).items.len(), 1);
        assert_eq!(state.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_commit_restores_cart() {
        let (state, milk) = state_with_product(5).await;
        let session = SessionId::new();
        state.carts.add(session, &milk, 2).unwrap();

        sqlx::query("UPDATE products SET stock = 1 WHERE id = ?1")
            .bind(milk.id)
            .execute(state.db.pool())
            .await
            .unwrap();

        let err = checkout(&state, session, &tender("20.00", "0.00")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let cart = state.carts.snapshot(session);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_cart_checks_out_once() {
        let (state, milk) = state_with_product(5).await;
        let session = SessionId::new();
        state.carts.add(session, &milk, 2).unwrap();

        checkout(&state, session, &tender("20.00", "0.00")).await.unwrap();
        let err = checkout(&state, session, &tender("20.00", "0.00")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(state.db.sales().count().await.unwrap(), 1);
        assert_eq!(state.db.products().get_stock(milk.id).await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let (state, _) = state_with_product(5).await;
        let err = checkout(&state, SessionId::new(), &tender("0", "0")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
