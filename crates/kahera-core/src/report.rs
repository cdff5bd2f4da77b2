//! # Report Aggregation
//!
//! Pure aggregations behind the transaction and product exports and the
//! inventory dashboard. The spreadsheet rendering itself happens in the
//! frontend; this module only produces the numbers.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{ExpiryStatus, Product, StockLevel, TransactionSummary};

// =============================================================================
// Date Ranges
// =============================================================================

/// Look-back window for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DateRange {
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange::Week
    }
}

impl DateRange {
    /// Start of the window ending at `now`.
    ///
    /// Months are calendar months, so `Month` from March 31 starts on
    /// February 28 (or 29).
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateRange::Week => now - Duration::weeks(1),
            DateRange::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
            DateRange::ThreeMonths => now
                .checked_sub_months(Months::new(3))
                .unwrap_or(now - Duration::days(90)),
        }
    }

    /// Whether `ts` falls inside `[start(now), now]`.
    pub fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        ts >= self.start(now) && ts <= now
    }
}

/// Keeps the transactions created inside the window.
pub fn filter_by_range(
    summaries: &[TransactionSummary],
    range: DateRange,
    now: DateTime<Utc>,
) -> Vec<&TransactionSummary> {
    summaries
        .iter()
        .filter(|s| range.contains(s.transaction.created_at, now))
        .collect()
}

// =============================================================================
// Sales
// =============================================================================

/// Per-product sales computed from line-item snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductSales {
    pub product_id: String,
    /// Name as of the first sale seen in the window.
    pub name: String,
    pub total_quantity: i64,
    pub total_amount_cents: i64,
    /// Quantity-weighted average unit price, rounded down to the centavo.
    pub average_price_cents: i64,
}

/// Aggregates line items by product, in order of first appearance.
///
/// Uses the snapshot prices, so later catalog edits do not change
/// historical figures.
pub fn product_sales<'a, I>(summaries: I) -> Vec<ProductSales>
where
    I: IntoIterator<Item = &'a TransactionSummary>,
{
    let mut rows: Vec<ProductSales> = Vec::new();

    for item in summaries.into_iter().flat_map(|s| s.items.iter()) {
        let amount = item.line_total().cents();
        match rows.iter_mut().find(|r| r.product_id == item.product_id) {
            Some(row) => {
                row.total_quantity += item.quantity;
                row.total_amount_cents += amount;
            }
            None => rows.push(ProductSales {
                product_id: item.product_id.clone(),
                name: item.product_name.clone(),
                total_quantity: item.quantity,
                total_amount_cents: amount,
                average_price_cents: 0,
            }),
        }
    }

    for row in &mut rows {
        if row.total_quantity > 0 {
            row.average_price_cents = row.total_amount_cents / row.total_quantity;
        }
    }
    rows
}

/// Summary block of the transaction export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesTotals {
    pub transaction_count: usize,
    pub gross_cents: i64,
    pub refunds_cents: i64,
    pub net_cents: i64,
}

pub fn sales_totals<'a, I>(summaries: I) -> SalesTotals
where
    I: IntoIterator<Item = &'a TransactionSummary>,
{
    let mut totals = SalesTotals::default();
    for summary in summaries {
        totals.transaction_count += 1;
        totals.gross_cents += summary.transaction.total_price_cents;
        totals.refunds_cents += summary.total_refund_cents;
    }
    totals.net_cents = totals.gross_cents - totals.refunds_cents;
    totals
}

/// Everything the sales export needs for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub range: DateRange,
    /// ISO 4217 code the amounts are in.
    pub currency: String,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub totals: SalesTotals,
    pub products: Vec<ProductSales>,
}

pub fn build_sales_report(
    summaries: &[TransactionSummary],
    range: DateRange,
    currency: &str,
    now: DateTime<Utc>,
) -> SalesReport {
    let in_range = filter_by_range(summaries, range, now);
    SalesReport {
        range,
        currency: currency.to_string(),
        generated_at: now,
        totals: sales_totals(in_range.iter().copied()),
        products: product_sales(in_range.iter().copied()),
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock and expiry counts for the inventory dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryOverview {
    pub total_products: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    /// Products needing attention: low stock, out of stock or expiring.
    pub attention: Vec<String>,
}

pub fn inventory_overview(products: &[Product], today: NaiveDate) -> InventoryOverview {
    let mut overview = InventoryOverview {
        total_products: products.len(),
        ..Default::default()
    };

    for product in products {
        let level = product.stock_level();
        match level {
            StockLevel::InStock => overview.in_stock += 1,
            StockLevel::LowStock => overview.low_stock += 1,
            StockLevel::OutOfStock => overview.out_of_stock += 1,
        }

        let expiry = product.expiry_status(today);
        match expiry {
            ExpiryStatus::Expired => overview.expired += 1,
            ExpiryStatus::ExpiringSoon => overview.expiring_soon += 1,
            ExpiryStatus::Good => {}
        }

        if level != StockLevel::InStock || expiry != ExpiryStatus::Good {
            overview.attention.push(product.id.clone());
        }
    }
    overview
}

// =============================================================================
// Unit Tests
// =============================================================================
