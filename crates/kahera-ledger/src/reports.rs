//! # Reports
//!
//! Read models over the ledger: the transaction listing, sales reports and
//! the inventory overview.
//!
//! ## Transaction Listing
//! ```text
//! transactions ⋈ payment_methods ──┐
//! line_items (tenant) ─────────────┼──► group by transaction_id ──► TransactionSummary
//! refunds (tenant) ────────────────┘        items, Σ refunds, "r1; r2"
//! ```
//! Three queries in one unit of work, grouped in memory, so every summary
//! is consistent with the others.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};

use kahera_core::report::{build_sales_report, inventory_overview, DateRange, InventoryOverview, SalesReport};
use kahera_core::time::local_date;
use kahera_core::{LineItem, Refund, TenantId, TransactionSummary};
use kahera_db::{Database, TransactionWithPaymentMethod};

use crate::error::LedgerResult;

#[derive(Debug, Clone)]
pub struct Reports {
    db: Database,
    utc_offset: FixedOffset,
    currency: String,
}

impl Reports {
    pub fn new(db: Database, utc_offset: FixedOffset, currency: impl Into<String>) -> Self {
        Reports {
            db,
            utc_offset,
            currency: currency.into(),
        }
    }

    /// Every transaction of the tenant, newest first, with its line items,
    /// refund total, refund reasons and payment method name.
    pub async fn list_transactions(&self, tenant: &TenantId) -> LedgerResult<Vec<TransactionSummary>> {
        let mut store = self.db.begin(tenant).await?;
        let headers = store.transactions().list_with_payment_method().await?;
        let items = store.line_items().list().await?;
        let refunds = store.refunds().list().await?;
        store.commit().await?;

        Ok(assemble_summaries(headers, items, refunds))
    }

    /// Totals and per-product sales for transactions created within `range`.
    pub async fn sales_report(
        &self,
        tenant: &TenantId,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> LedgerResult<SalesReport> {
        let summaries = self.list_transactions(tenant).await?;
        Ok(build_sales_report(&summaries, range, &self.currency, now))
    }

    /// Stock and expiry counts, with expiry judged by the tenant's local date.
    pub async fn inventory_report(
        &self,
        tenant: &TenantId,
        now: DateTime<Utc>,
    ) -> LedgerResult<InventoryOverview> {
        let mut store = self.db.begin(tenant).await?;
        let products = store.products().list().await?;
        store.commit().await?;

        Ok(inventory_overview(&products, local_date(now, self.utc_offset)))
    }
}

/// Groups line items and refunds under their transaction headers.
///
/// Header order is kept. Refund reasons that are missing or blank are left
/// out of the joined string; a transaction without any gets `None`.
fn assemble_summaries(
    headers: Vec<TransactionWithPaymentMethod>,
    items: Vec<LineItem>,
    refunds: Vec<Refund>,
) -> Vec<TransactionSummary> {
    let mut items_by_txn: HashMap<String, Vec<LineItem>> = HashMap::new();
    for item in items {
        items_by_txn
            .entry(item.transaction_id.clone())
            .or_default()
            .push(item);
    }

    let mut refunds_by_txn: HashMap<String, Vec<Refund>> = HashMap::new();
    for refund in refunds {
        refunds_by_txn
            .entry(refund.transaction_id.clone())
            .or_default()
            .push(refund);
    }

    headers
        .into_iter()
        .map(|row| {
            let id = row.transaction.id.as_str();
            let refunds = refunds_by_txn.remove(id).unwrap_or_default();

            let total_refund_cents = refunds.iter().map(|r| r.amount_cents).sum();
            let reasons: Vec<&str> = refunds
                .iter()
                .filter_map(|r| r.reason.as_deref())
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .collect();
            let refund_reasons = (!reasons.is_empty()).then(|| reasons.join("; "));

            TransactionSummary {
                items: items_by_txn.remove(id).unwrap_or_default(),
                total_refund_cents,
                refund_reasons,
                payment_method_name: row.payment_method_name,
                transaction: row.transaction,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RestockPolicy;
    use crate::refunds::RefundService;
    use crate::sales::SalesLedger;
    use crate::test_support::*;
    use kahera_core::time::tenant_offset;
    use kahera_core::{RefundRequest, TransactionStatus};

    fn reports(db: &Database) -> Reports {
        Reports::new(db.clone(), tenant_offset(480).unwrap(), "PHP")
    }

    async fn refund(db: &Database, t: &TenantId, txn: &str, amount_cents: i64, reason: Option<&str>) {
        RefundService::new(db.clone(), RestockPolicy::Never)
            .create_refund(
                t,
                RefundRequest {
                    transaction_id: txn.to_string(),
                    amount_cents,
                    reason: reason.map(str::to_string),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_transactions_aggregates_items_and_refunds() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 10).await;
        let asukal = seed_product(&db, &t, "ASUKAL-1K", 8_000, 10).await;
        let gcash = seed_payment_method(&db, &t, "GCash").await;
        let sales = SalesLedger::new(db.clone(), tenant_offset(480).unwrap());

        let mut request = sale(&[(kape.id.as_str(), 4)], 50_000, None);
        request.header.payment_method_id = Some(gcash.id.clone());
        let first = sales.record_sale(&t, request).await.unwrap();

        let second = sales
            .record_sale(
                &t,
                sale(&[(kape.id.as_str(), 1), (asukal.id.as_str(), 2)], 28_500, Some(30_000)),
            )
            .await
            .unwrap();

        refund(&db, &t, &first.transaction_id, 20_000, Some("damaged")).await;
        refund(&db, &t, &first.transaction_id, 5_000, Some("  ")).await;
        refund(&db, &t, &first.transaction_id, 5_000, Some("wrong size")).await;

        let summaries = reports(&db).list_transactions(&t).await.unwrap();
        assert_eq!(summaries.len(), 2);

        let refunded = summaries
            .iter()
            .find(|s| s.transaction.id == first.transaction_id)
            .unwrap();
        assert_eq!(refunded.payment_method_name.as_deref(), Some("GCash"));
        assert_eq!(refunded.items.len(), 1);
        assert_eq!(refunded.total_refund_cents, 30_000);
        assert_eq!(refunded.refund_reasons.as_deref(), Some("damaged; wrong size"));
        assert_eq!(refunded.transaction.status, TransactionStatus::PartiallyRefunded);
        assert_eq!(refunded.net_total().cents(), 20_000);

        let plain = summaries
            .iter()
            .find(|s| s.transaction.id == second.transaction_id)
            .unwrap();
        assert_eq!(plain.payment_method_name, None);
        assert_eq!(plain.items.len(), 2);
        assert_eq!(plain.total_refund_cents, 0);
        assert_eq!(plain.refund_reasons, None);

        // Another tenant sees nothing
        assert!(reports(&db)
            .list_transactions(&tenant("tenant-b"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_sales_and_inventory_reports() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 6).await;
        seed_product(&db, &t, "ASUKAL-1K", 8_000, 0).await;

        let receipt = SalesLedger::new(db.clone(), tenant_offset(480).unwrap())
            .record_sale(&t, sale(&[(kape.id.as_str(), 4)], 50_000, None))
            .await
            .unwrap();
        refund(&db, &t, &receipt.transaction_id, 10_000, None).await;

        let report = reports(&db)
            .sales_report(&t, DateRange::Week, Utc::now())
            .await
            .unwrap();
        assert_eq!(report.currency, "PHP");
        assert_eq!(report.totals.transaction_count, 1);
        assert_eq!(report.totals.gross_cents, 50_000);
        assert_eq!(report.totals.net_cents, 40_000);
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].total_quantity, 4);

        let overview = reports(&db).inventory_report(&t, Utc::now()).await.unwrap();
        assert_eq!(overview.total_products, 2);
        // 2 left against a threshold of 5
        assert_eq!(overview.low_stock, 1);
        assert_eq!(overview.out_of_stock, 1);
        assert_eq!(overview.attention.len(), 2);
    }
}
