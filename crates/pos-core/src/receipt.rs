//! # Receipt Projection
//!
//! Builds a printable receipt from committed sale rows. Pure: the rows,
//! settings and tax rates are all handed in.
//!
//! ## Projection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleTransaction rows (any order of batches)                            │
//! │       │                                                                 │
//! │       ▼  group by batch_id, first-seen order                            │
//! │  ReceiptBatch                                                           │
//! │    total     = Σ amount                                                 │
//! │    tax[name] = Σ line.amount × rate   (rounded half-up per line)        │
//! │    subtotal  = total − Σ tax                                            │
//! │       │                                                                 │
//! │       ▼  every figure also formatted with the currency symbol           │
//! │  ReceiptView { store header, batches, footer }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Committed amounts are tax-inclusive, so tax is carved out of the total
//! rather than added on top.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{NamedTaxRate, SaleTransaction, StoreSettings};

/// One product line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub unit_price: Money,
    pub unit_price_display: String,
    #[ts(as = "String")]
    pub amount: Money,
    pub amount_display: String,
}

/// One named tax carved out of a batch total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLine {
    pub name: String,
    pub rate_bps: u32,
    pub rate_label: String,
    #[ts(as = "String")]
    pub amount: Money,
    pub amount_display: String,
}

/// All lines of one checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptBatch {
    pub batch_id: String,
    pub customer_name: String,
    pub date: String,
    pub payment_method: String,
    pub lines: Vec<ReceiptLine>,
    #[ts(as = "String")]
    pub subtotal: Money,
    pub subtotal_display: String,
    pub taxes: Vec<TaxLine>,
    #[ts(as = "String")]
    pub tax_total: Money,
    pub tax_total_display: String,
    #[ts(as = "String")]
    pub total: Money,
    pub total_display: String,
    #[ts(as = "String")]
    pub amount_paid: Money,
    pub amount_paid_display: String,
    #[ts(as = "String")]
    pub change_given: Money,
    pub change_given_display: String,
}

/// A receipt ready to print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptView {
    pub store_name: String,
    pub address: String,
    pub contact: String,
    pub header: String,
    pub footer: String,
    pub receipt_width: u32,
    pub batches: Vec<ReceiptBatch>,
}

/// Projects sale rows into a receipt.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, Utc};
/// use pos_core::receipt::project;
/// use pos_core::{Money, NamedTaxRate, SaleStatus, SaleTransaction, StoreSettings, TaxRate};
///
/// let row = SaleTransaction {
///     id: 1,
///     batch_id: "b-1".into(),
///     store_id: 1,
///     store_name: None,
///     product_id: 7,
///     product_name: "Bread".into(),
///     customer_name: "Guest".into(),
///     quantity: 2,
///     amount: Money::from_cents(2000),
///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     payment_method: "Cash".into(),
///     status: SaleStatus::Completed,
///     amount_paid: Money::from_cents(2000),
///     change_given: Money::zero(),
///     created_at: Utc::now(),
/// };
/// let vat = NamedTaxRate { name: "VAT".into(), rate: TaxRate::from_bps(1250) };
///
/// let receipt = project(&[row], &StoreSettings::default(), &[vat]);
/// let batch = &receipt.batches[0];
/// assert_eq!(batch.total_display, "GHS20.00");
/// assert_eq!(batch.tax_total.cents(), 250);
/// assert_eq!(batch.subtotal.cents(), 1750);
/// ```
pub fn project(
    transactions: &[SaleTransaction],
    settings: &StoreSettings,
    tax_rates: &[NamedTaxRate],
) -> ReceiptView {
    let mut groups: Vec<(&str, Vec<&SaleTransaction>)> = Vec::new();
    for tx in transactions {
        match groups.iter_mut().find(|(id, _)| *id == tx.batch_id.as_str()) {
            Some((_, rows)) => rows.push(tx),
            None => groups.push((tx.batch_id.as_str(), vec![tx])),
        }
    }

    let batches = groups
        .into_iter()
        .map(|(batch_id, rows)| project_batch(batch_id, &rows, settings, tax_rates))
        .collect();

    ReceiptView {
        store_name: settings.store_name.clone(),
        address: settings.address.clone(),
        contact: settings.contact.clone(),
        header: settings.receipt_header.clone(),
        footer: settings.receipt_footer.clone(),
        receipt_width: settings.receipt_width,
        batches,
    }
}

fn project_batch(
    batch_id: &str,
    rows: &[&SaleTransaction],
    settings: &StoreSettings,
    tax_rates: &[NamedTaxRate],
) -> ReceiptBatch {
    let fmt = |m: Money| settings.format_currency(m);

    let lines: Vec<ReceiptLine> = rows
        .iter()
        .map(|tx| {
            let unit_price = if tx.quantity > 0 {
                Money::from_cents(tx.amount.cents() / tx.quantity)
            } else {
                tx.amount
            };
            ReceiptLine {
                product_id: tx.product_id,
                product_name: tx.product_name.clone(),
                quantity: tx.quantity,
                unit_price,
                unit_price_display: fmt(unit_price),
                amount: tx.amount,
                amount_display: fmt(tx.amount),
            }
        })
        .collect();

    let total: Money = rows.iter().map(|tx| tx.amount).sum();

    let taxes: Vec<TaxLine> = tax_rates
        .iter()
        .map(|rate| {
            let amount: Money = rows
                .iter()
                .map(|tx| tx.amount.calculate_tax(rate.rate))
                .sum();
            TaxLine {
                name: rate.name.clone(),
                rate_bps: rate.rate.bps(),
                rate_label: rate.rate.percentage_label(),
                amount,
                amount_display: fmt(amount),
            }
        })
        .collect();

    let tax_total: Money = taxes.iter().map(|t| t.amount).sum();
    let subtotal = total - tax_total;

    // Tender fields are identical on every row of a batch
    let first = rows[0];

    ReceiptBatch {
        batch_id: batch_id.to_string(),
        customer_name: first.customer_name.clone(),
        date: first.date.format("%Y-%m-%d").to_string(),
        payment_method: first.payment_method.clone(),
        lines,
        subtotal,
        subtotal_display: fmt(subtotal),
        taxes,
        tax_total,
        tax_total_display: fmt(tax_total),
        total,
        total_display: fmt(total),
        amount_paid: first.amount_paid,
        amount_paid_display: fmt(first.amount_paid),
        change_given: first.change_given,
        change_given_display: fmt(first.change_given),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
