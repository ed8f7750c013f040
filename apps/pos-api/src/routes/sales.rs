//! # Sales Routes
//!
//! Listing, token-guarded deletion and receipt reprint of committed sales.
//!
//! Sale ids never reach the client in links. Each listed row carries a fresh
//! `delete_token`; the delete route decodes it back to the id.
//!
//! ```text
//! fetch_sales ──► row { id: 42, ..., delete_token: "q3Jx...Zw.Vb9...A" }
//!                                              │
//! GET /api/sales/delete/q3Jx...Zw.Vb9...A ◄────┘
//!        │
//!        ├── decode ok ──► DELETE FROM sales WHERE id = 42
//!        └── tampered ───► 400 INVALID_TOKEN
//! ```

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use pos_core::validation::{validate_date_field, validate_page, validate_uuid};
use pos_core::{
    receipt, CoreError, ReceiptView, SaleStatus, SaleTransaction, ValidationError,
    DEFAULT_PAGE_SIZE,
};
use pos_db::SalesFilter;

/// Query string of `fetch_sales`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSalesQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: i64,
    /// `Completed`, `Pending`, `Cancelled`, or `All`/empty for no filter.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub store_id: Option<i64>,
    /// Single day; overrides `date_from`/`date_to`.
    #[serde(default)]
    pub filter_date: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_rows_per_page() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => validate_date_field(field, v).map(Some),
        _ => Ok(None),
    }
}

impl FetchSalesQuery {
    fn filter(&self) -> Result<SalesFilter, ValidationError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(SaleStatus::parse(s).ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: SaleStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })?),
        };

        let (date_from, date_to) = match parse_optional_date("filter_date", self.filter_date.as_deref())? {
            Some(day) => (Some(day), Some(day)),
            None => (
                parse_optional_date("date_from", self.date_from.as_deref())?,
                parse_optional_date("date_to", self.date_to.as_deref())?,
            ),
        };

        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(ValidationError::InvalidFormat {
                    field: "date_from".to_string(),
                    reason: "must not be after date_to".to_string(),
                });
            }
        }

        Ok(SalesFilter {
            status,
            store_id: self.store_id,
            date_from,
            date_to,
        })
    }
}

/// A listed sale with its delete link token.
#[derive(Debug, Clone, Serialize)]
pub struct SaleRow {
    #[serde(flatten)]
    pub sale: SaleTransaction,
    pub delete_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesListResponse {
    pub success: bool,
    pub sales: Vec<SaleRow>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSaleResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptResponse {
    pub success: bool,
    pub receipt: ReceiptView,
}

/// GET /api/fetch_sales
pub async fn fetch_sales(
    State(state): State<AppState>,
    query: Result<Query<FetchSalesQuery>, QueryRejection>,
) -> Result<Json<SalesListResponse>, ApiError> {
    let Query(query) = query?;
    let page = validate_page(query.page, query.rows_per_page)?;
    let filter = query.filter()?;

    debug!(?filter, page = page.page, page_size = page.page_size, "fetch_sales");

    let listing = state.db.sales().list(&filter, page).await?;

    let sales = listing
        .rows
        .into_iter()
        .map(|sale| -> Result<SaleRow, ApiError> {
            Ok(SaleRow {
                delete_token: state.tokens.encode(sale.id)?,
                sale,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(SalesListResponse {
        success: true,
        sales,
        current_page: listing.page,
        total_pages: listing.total_pages,
        total_rows: listing.total_rows,
    }))
}

/// GET /api/sales/delete/{token}
///
/// Stock is not restored; deleting a sale removes the record only.
pub async fn delete_sale(
    State(state): State<AppState>,
    token: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteSaleResponse>, ApiError> {
    let Path(token) = token?;
    let id = state.tokens.decode(&token)?;

    state.db.sales().delete(id).await?;

    Ok(Json(DeleteSaleResponse {
        success: true,
        message: "Sale deleted successfully".to_string(),
    }))
}

/// GET /api/receipts/{batch_id}
pub async fn get_receipt(
    State(state): State<AppState>,
    batch_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    let Path(batch_id) = batch_id?;
    let batch_id = validate_uuid(&batch_id)?.to_string();

    let rows = state.db.sales().get_by_batch(&batch_id).await?;
    if rows.is_empty() {
        return Err(CoreError::SaleNotFound(batch_id).into());
    }

    let settings = state.db.settings().load().await?;
    let tax_rates = state.db.settings().tax_rates().await?;

    Ok(Json(ReceiptResponse {
        success: true,
        receipt: receipt::project(&rows, &settings, &tax_rates),
    }))
}
