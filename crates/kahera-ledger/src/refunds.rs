//! # Refund Service
//!
//! Refunds are money-only records against a transaction. The sum of a
//! transaction's refunds never exceeds its total, and its status always
//! reflects that sum.
//!
//! ## Flow
//! ```text
//! validate ─► BEGIN ─► INSERT refund … WHERE Σ + amount <= total
//!                          │
//!               0 rows ────┼──► transaction missing?  → NotFound
//!                          │    otherwise             → InvalidRefundAmount
//!                          ▼
//!               recompute status ─► UPDATE transactions.status
//!                          │
//!               restock policy (OnFullRefund && refunded)
//!                          │     → stock += line quantities, one
//!                          │       stock adjustment per line item
//!                          ▼
//!                       COMMIT ─► RefundOutcome
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use kahera_core::ledger::{check_refund, remaining_refundable};
use kahera_core::request::non_blank;
use kahera_core::{
    Money, RefundOutcome, RefundRequest, StockAdjustment, TenantId, TransactionStatus,
};
use kahera_db::{Database, TenantStore};

use crate::config::RestockPolicy;
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone)]
pub struct RefundService {
    db: Database,
    restock_policy: RestockPolicy,
}

impl RefundService {
    pub fn new(db: Database, restock_policy: RestockPolicy) -> Self {
        RefundService { db, restock_policy }
    }

    /// Records a refund and recomputes the transaction's status.
    ///
    /// ## Errors
    /// - `Validation`: non-positive amount, overlong reason
    /// - `NotFound`: unknown or cross-tenant transaction
    /// - `InvalidRefundAmount`: the amount exceeds what is still refundable
    /// - `Storage`
    pub async fn create_refund(
        &self,
        tenant: &TenantId,
        request: RefundRequest,
    ) -> LedgerResult<RefundOutcome> {
        let result = self.try_create_refund(tenant, &request).await;

        match &result {
            Ok(outcome) => info!(
                tenant = %tenant,
                transaction_id = %request.transaction_id,
                amount = %outcome.refund.amount(),
                status = %outcome.new_status,
                restocked = outcome.restocked.len(),
                "Refund recorded"
            ),
            Err(e) => warn!(
                tenant = %tenant,
                transaction_id = %request.transaction_id,
                code = ?e.code(),
                error = %e,
                "Refund rejected"
            ),
        }

        result
    }

    async fn try_create_refund(
        &self,
        tenant: &TenantId,
        request: &RefundRequest,
    ) -> LedgerResult<RefundOutcome> {
        request.validate()?;

        let transaction_id = request.transaction_id.as_str();
        let requested = Money::from_cents(request.amount_cents);
        let now = Utc::now();

        let mut store = self.db.begin(tenant).await?;

        let inserted = store
            .refunds()
            .insert_within_balance(transaction_id, request.amount_cents, non_blank(&request.reason), now)
            .await?;

        let refund = match inserted {
            Some(refund) => refund,
            None => {
                let transaction = store
                    .transactions()
                    .find_by_id(transaction_id)
                    .await?
                    .ok_or_else(|| LedgerError::not_found("Transaction", transaction_id))?;
                let already = Money::from_cents(store.refunds().total_for_transaction(transaction_id).await?);

                return Err(LedgerError::InvalidRefundAmount {
                    remaining: remaining_refundable(transaction.total_price(), already),
                    requested,
                });
            }
        };

        let transaction = store.transactions().get(transaction_id).await?;
        let total_refunded = Money::from_cents(store.refunds().total_for_transaction(transaction_id).await?);
        let check = check_refund(transaction.total_price(), total_refunded - requested, requested)?;

        store
            .transactions()
            .update_status(transaction_id, check.status, now)
            .await?;

        let restocked = if self.restock_policy == RestockPolicy::OnFullRefund
            && check.status == TransactionStatus::Refunded
        {
            restock_line_items(&mut store, transaction_id, now).await?
        } else {
            Vec::new()
        };

        store.commit().await?;

        Ok(RefundOutcome {
            refund,
            new_status: check.status,
            total_refunded_cents: check.total_refunded.cents(),
            remaining_cents: check.remaining.cents(),
            restocked,
        })
    }
}

/// Returns every line item's quantity to its product. Products deleted since
/// the sale are skipped.
async fn restock_line_items(
    store: &mut TenantStore,
    transaction_id: &str,
    now: DateTime<Utc>,
) -> LedgerResult<Vec<StockAdjustment>> {
    let reason = format!("refund:{transaction_id}");
    let items = store.line_items().list_for_transaction(transaction_id).await?;

    let mut adjustments = Vec::with_capacity(items.len());
    for item in items {
        let Some(product) = store
            .products()
            .increment_stock(&item.product_id, item.quantity, now)
            .await?
        else {
            debug!(product_id = %item.product_id, "Skipping restock of deleted product");
            continue;
        };

        let adjustment = store
            .stock_adjustments()
            .insert(&product.id, item.quantity, Some(&reason), product.stock, now)
            .await?;
        adjustments.push(adjustment);
    }

    Ok(adjustments)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sales::SalesLedger;
    use crate::test_support::*;
    use kahera_core::time::tenant_offset;
    use kahera_core::ValidationError;

    fn refund(transaction_id: &str, amount_cents: i64, reason: Option<&str>) -> RefundRequest {
        RefundRequest {
            transaction_id: transaction_id.to_string(),
            amount_cents,
            reason: reason.map(str::to_string),
        }
    }

    /// One 500.00 sale of 4 × 125.00.
    async fn setup(db: &Database, t: &TenantId) -> (String, String) {
        let kape = seed_product(db, t, "KAPE-250", 12_500, 10).await;
        let receipt = SalesLedger::new(db.clone(), tenant_offset(480).unwrap())
            .record_sale(t, sale(&[(kape.id.as_str(), 4)], 50_000, Some(50_000)))
            .await
            .unwrap();
        (receipt.transaction_id, kape.id)
    }

    async fn status_of(db: &Database, t: &TenantId, id: &str) -> TransactionStatus {
        let mut store = db.begin(t).await.unwrap();
        store.transactions().get(id).await.unwrap().status
    }

    #[tokio::test]
    async fn test_partial_then_full_refund() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let (txn, _) = setup(&db, &t).await;
        let service = RefundService::new(db.clone(), RestockPolicy::Never);

        let first = service
            .create_refund(&t, refund(&txn, 20_000, Some("damaged")))
            .await
            .unwrap();
        assert_eq!(first.new_status, TransactionStatus::PartiallyRefunded);
        assert_eq!(first.total_refunded_cents, 20_000);
        assert_eq!(first.remaining_cents, 30_000);
        assert_eq!(first.refund.reason.as_deref(), Some("damaged"));

        let second = service
            .create_refund(&t, refund(&txn, 30_000, None))
            .await
            .unwrap();
        assert_eq!(second.new_status, TransactionStatus::Refunded);
        assert_eq!(second.remaining_cents, 0);
        assert!(second.restocked.is_empty());

        assert_eq!(status_of(&db, &t, &txn).await, TransactionStatus::Refunded);
    }

    #[tokio::test]
    async fn test_over_refund_is_rejected_and_status_untouched() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let (txn, _) = setup(&db, &t).await;
        let service = RefundService::new(db.clone(), RestockPolicy::Never);

        service
            .create_refund(&t, refund(&txn, 20_000, None))
            .await
            .unwrap();

        let err = service
            .create_refund(&t, refund(&txn, 40_000, None))
            .await
            .unwrap_err();
        match err {
            LedgerError::InvalidRefundAmount { remaining, requested } => {
                assert_eq!(remaining.cents(), 30_000);
                assert_eq!(requested.cents(), 40_000);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            status_of(&db, &t, &txn).await,
            TransactionStatus::PartiallyRefunded
        );
        let mut store = db.begin(&t).await.unwrap();
        assert_eq!(store.refunds().total_for_transaction(&txn).await.unwrap(), 20_000);
    }

    #[tokio::test]
    async fn test_refund_of_unknown_or_foreign_transaction_is_not_found() {
        let db = memory_db().await;
        let a = tenant("tenant-a");
        let (txn, _) = setup(&db, &a).await;
        let service = RefundService::new(db.clone(), RestockPolicy::Never);

        let err = service
            .create_refund(&a, refund(MISSING_ID, 100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));

        let err = service
            .create_refund(&tenant("tenant-b"), refund(&txn, 100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
        assert_eq!(status_of(&db, &a, &txn).await, TransactionStatus::Active);
    }

    #[tokio::test]
    async fn test_invalid_refund_requests() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let (txn, _) = setup(&db, &t).await;
        let service = RefundService::new(db.clone(), RestockPolicy::Never);

        assert!(matches!(
            service.create_refund(&t, refund(&txn, 0, None)).await,
            Err(LedgerError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let long_reason = "x".repeat(501);
        assert!(matches!(
            service
                .create_refund(&t, refund(&txn, 100, Some(&long_reason)))
                .await,
            Err(LedgerError::Validation(ValidationError::TooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn test_full_refund_restocks_when_configured() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let (txn, kape_id) = setup(&db, &t).await;
        assert_eq!(stock_of(&db, &t, &kape_id).await, 6);

        let service = RefundService::new(db.clone(), RestockPolicy::OnFullRefund);

        let partial = service
            .create_refund(&t, refund(&txn, 10_000, None))
            .await
            .unwrap();
        assert!(partial.restocked.is_empty());
        assert_eq!(stock_of(&db, &t, &kape_id).await, 6);

        let full = service
            .create_refund(&t, refund(&txn, 40_000, None))
            .await
            .unwrap();
        assert_eq!(full.restocked.len(), 1);
        assert_eq!(full.restocked[0].delta, 4);
        assert_eq!(full.restocked[0].stock_after, 10);
        assert_eq!(
            full.restocked[0].reason.as_deref(),
            Some(format!("refund:{txn}").as_str())
        );
        assert_eq!(stock_of(&db, &t, &kape_id).await, 10);
    }

    #[tokio::test]
    async fn test_full_refund_skips_deleted_products() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let (txn, kape_id) = setup(&db, &t).await;

        let mut store = db.begin(&t).await.unwrap();
        store.products().delete_by_id(&kape_id, Utc::now()).await.unwrap();
        store.commit().await.unwrap();

        let outcome = RefundService::new(db.clone(), RestockPolicy::OnFullRefund)
            .create_refund(&t, refund(&txn, 50_000, None))
            .await
            .unwrap();
        assert_eq!(outcome.new_status, TransactionStatus::Refunded);
        assert!(outcome.restocked.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_refunds_never_exceed_total() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir, 6).await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 100).await;

        let sales = Arc::new(SalesLedger::new(db.clone(), tenant_offset(480).unwrap()));
        let txn = sales
            .record_sale(&t, sale(&[(kape.id.as_str(), 4)], 50_000, None))
            .await
            .unwrap()
            .transaction_id;
        let refunds = Arc::new(RefundService::new(db.clone(), RestockPolicy::Never));

        // Refunds of 100.00 against a 500.00 sale, racing unrelated sales
        let mut refund_handles = Vec::new();
        let mut sale_handles = Vec::new();
        for _ in 0..15 {
            let service = Arc::clone(&refunds);
            let (t2, request) = (t.clone(), refund(&txn, 10_000, Some("returned")));
            refund_handles.push(tokio::spawn(async move { service.create_refund(&t2, request).await }));

            let ledger = Arc::clone(&sales);
            let (t2, request) = (t.clone(), sale(&[(kape.id.as_str(), 1)], 12_500, None));
            sale_handles.push(tokio::spawn(async move { ledger.record_sale(&t2, request).await }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for handle in refund_handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(LedgerError::InvalidRefundAmount { .. }) => rejected += 1,
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
        for handle in sale_handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(accepted, 5);
        assert_eq!(rejected, 10);
        assert_eq!(status_of(&db, &t, &txn).await, TransactionStatus::Refunded);
        let mut store = db.begin(&t).await.unwrap();
        assert_eq!(store.refunds().total_for_transaction(&txn).await.unwrap(), 50_000);
        drop(store);
        assert_eq!(stock_of(&db, &t, &kape.id).await, 81);
    }
}
