//! # Sales Ledger
//!
//! `record_sale` turns a register's sale into a transaction header, its
//! line items and the matching stock decrements, all in one unit of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         record_sale                                     │
//! │                                                                         │
//! │  validate request ──────────────────────────── ValidationError          │
//! │       │                                                                 │
//! │  BEGIN (TenantStore)                                                    │
//! │       │                                                                 │
//! │  for each product (repeats merged):                                     │
//! │       UPDATE stock = stock - q WHERE stock >= q                         │
//! │         ├── 1 row  → snapshot row kept                                  │
//! │         └── 0 rows → re-read: missing → NotFound                        │
//! │                               short   → InsufficientStock               │
//! │       │                                                                 │
//! │  payment method exists? ────────────────────── NotFound                 │
//! │  declared total == Σ snapshot price × qty? ─── ValidationError          │
//! │       │                                                                 │
//! │  INSERT header, INSERT line items (snapshots)                           │
//! │       │                                                                 │
//! │  COMMIT ──────────────────────────────────────► SaleReceipt             │
//! │                                                                         │
//! │  Any error before COMMIT drops the store: nothing is written.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is the first statement of the unit, so the unit holds the
//! SQLite write lock before it reads anything.

use chrono::{FixedOffset, Utc};
use tracing::{info, warn};

use kahera_core::ledger::{change_due, merge_quantities, sale_total, verify_declared_total};
use kahera_core::request::non_blank;
use kahera_core::time::parse_client_timestamp;
use kahera_core::{CoreError, Money, Product, RecordSaleRequest, SaleReceipt, TenantId};
use kahera_db::{Database, NewTransaction};

use crate::error::{LedgerError, LedgerResult};

/// Records sales.
#[derive(Debug, Clone)]
pub struct SalesLedger {
    db: Database,
    utc_offset: FixedOffset,
}

impl SalesLedger {
    pub fn new(db: Database, utc_offset: FixedOffset) -> Self {
        SalesLedger { db, utc_offset }
    }

    /// Records a sale atomically.
    ///
    /// ## Errors
    /// - `Validation`: malformed request, or a declared total that differs
    ///   from the server's snapshot total
    /// - `NotFound`: unknown, deleted or cross-tenant product or payment method
    /// - `InsufficientStock`: a product cannot cover its (merged) quantity
    /// - `Storage`
    pub async fn record_sale(
        &self,
        tenant: &TenantId,
        request: RecordSaleRequest,
    ) -> LedgerResult<SaleReceipt> {
        let result = self.try_record_sale(tenant, &request).await;

        match &result {
            Ok(receipt) => info!(
                tenant = %tenant,
                transaction_id = %receipt.transaction_id,
                total = %Money::from_cents(receipt.total_price_cents),
                items = receipt.item_count,
                "Sale recorded"
            ),
            Err(e) => warn!(
                tenant = %tenant,
                code = ?e.code(),
                error = %e,
                "Sale rejected"
            ),
        }

        result
    }

    async fn try_record_sale(
        &self,
        tenant: &TenantId,
        request: &RecordSaleRequest,
    ) -> LedgerResult<SaleReceipt> {
        request.validate()?;

        let header = &request.header;
        let client_reported_at = non_blank(&header.client_timestamp)
            .map(|raw| parse_client_timestamp(raw, self.utc_offset))
            .transpose()?;
        let now = Utc::now();

        let mut store = self.db.begin(tenant).await?;

        // Stock first: check and take in one statement per product
        let wanted = merge_quantities(
            request
                .items
                .iter()
                .map(|item| (item.product_id.as_str(), item.quantity)),
        );

        let mut snapshots: Vec<Product> = Vec::with_capacity(wanted.len());
        for (product_id, quantity) in &wanted {
            match store.products().decrement_stock(product_id, *quantity, now).await? {
                Some(product) => snapshots.push(product),
                None => {
                    let err = match store.products().find_by_id(product_id).await? {
                        None => LedgerError::not_found("Product", product_id.as_str()),
                        Some(product) => CoreError::InsufficientStock {
                            product_id: product_id.clone(),
                            available: product.stock,
                            requested: *quantity,
                        }
                        .into(),
                    };
                    return Err(err);
                }
            }
        }

        let payment_method_id = non_blank(&header.payment_method_id).map(str::to_string);
        if let Some(id) = &payment_method_id {
            if store.payment_methods().find_by_id(id).await?.is_none() {
                return Err(LedgerError::not_found("PaymentMethod", id.as_str()));
            }
        }

        let computed = sale_total(
            snapshots
                .iter()
                .zip(&wanted)
                .map(|(product, (_, quantity))| (product.sell_price(), *quantity)),
        )?;
        verify_declared_total(Money::from_cents(header.total_price_cents), computed)?;

        let transaction = store
            .transactions()
            .insert(
                &NewTransaction {
                    payment_method_id,
                    total_price_cents: computed.cents(),
                    cash_received_cents: header.cash_received_cents,
                    email_to: non_blank(&header.email_to).map(str::to_string),
                    reference_number: non_blank(&header.reference_number).map(str::to_string),
                    client_reported_at,
                },
                now,
            )
            .await?;

        for item in &request.items {
            let product = snapshots
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| LedgerError::not_found("Product", item.product_id.as_str()))?;

            store
                .line_items()
                .insert(&transaction.id, product, item.quantity, now)
                .await?;
        }

        store.commit().await?;

        let change_cents = change_due(transaction.cash_received(), computed).map(|change| change.cents());
        Ok(SaleReceipt {
            transaction_id: transaction.id,
            total_price_cents: computed.cents(),
            change_cents,
            item_count: request.items.len(),
            success: true,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::*;
    use kahera_core::time::tenant_offset;
    use kahera_core::{TransactionStatus, ValidationError};

    fn ledger(db: &Database) -> SalesLedger {
        SalesLedger::new(db.clone(), tenant_offset(480).unwrap())
    }

    async fn transaction_count(db: &Database, tenant: &TenantId) -> usize {
        let mut store = db.begin(tenant).await.unwrap();
        store.transactions().list_with_payment_method().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock_and_snapshots_prices() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 10).await;
        let asukal = seed_product(&db, &t, "ASUKAL-1K", 8_000, 3).await;

        let receipt = ledger(&db)
            .record_sale(
                &t,
                sale(&[(kape.id.as_str(), 2), (asukal.id.as_str(), 1)], 33_000, Some(50_000)),
            )
            .await
            .unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.total_price_cents, 33_000);
        assert_eq!(receipt.change_cents, Some(17_000));
        assert_eq!(receipt.item_count, 2);

        assert_eq!(stock_of(&db, &t, &kape.id).await, 8);
        assert_eq!(stock_of(&db, &t, &asukal.id).await, 2);

        let mut store = db.begin(&t).await.unwrap();
        let txn = store.transactions().get(&receipt.transaction_id).await.unwrap();
        assert_eq!(txn.status, TransactionStatus::Active);
        assert_eq!(txn.client_reported_at, None);

        let items = store
            .line_items()
            .list_for_transaction(&receipt.transaction_id)
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Product KAPE-250");
        assert_eq!(items[0].unit_sell_price_cents, 12_500);
        assert_eq!(items[0].unit_buy_price_cents, 6_250);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 10).await;
        let asukal = seed_product(&db, &t, "ASUKAL-1K", 8_000, 6).await;

        let err = ledger(&db)
            .record_sale(
                &t,
                sale(&[(kape.id.as_str(), 2), (asukal.id.as_str(), 10)], 105_000, None),
            )
            .await
            .unwrap_err();

        match err {
            LedgerError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, asukal.id);
                assert_eq!(available, 6);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected {other:?}"),
        }

        // The first product's decrement was rolled back too
        assert_eq!(stock_of(&db, &t, &kape.id).await, 10);
        assert_eq!(stock_of(&db, &t, &asukal.id).await, 6);
        assert_eq!(transaction_count(&db, &t).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_cross_tenant_products_are_not_found() {
        let db = memory_db().await;
        let a = tenant("tenant-a");
        let b = tenant("tenant-b");
        let theirs = seed_product(&db, &b, "KAPE-250", 12_500, 10).await;

        let err = ledger(&db)
            .record_sale(&a, sale(&[(MISSING_ID, 1)], 100, None))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));

        let err = ledger(&db)
            .record_sale(&a, sale(&[(theirs.id.as_str(), 1)], 12_500, None))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));

        assert_eq!(stock_of(&db, &b, &theirs.id).await, 10);
        assert_eq!(transaction_count(&db, &a).await, 0);
    }

    #[tokio::test]
    async fn test_declared_total_must_match_snapshot_total() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 10).await;

        let err = ledger(&db)
            .record_sale(&t, sale(&[(kape.id.as_str(), 2)], 20_000, None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::Mismatch {
                declared: 20_000,
                computed: 25_000,
                ..
            })
        ));
        assert_eq!(stock_of(&db, &t, &kape.id).await, 10);
        assert_eq!(transaction_count(&db, &t).await, 0);
    }

    #[tokio::test]
    async fn test_repeated_products_are_applied_cumulatively() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 5).await;

        let err = ledger(&db)
            .record_sale(&t, sale(&[(kape.id.as_str(), 3), (kape.id.as_str(), 3)], 75_000, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));

        let receipt = ledger(&db)
            .record_sale(&t, sale(&[(kape.id.as_str(), 2), (kape.id.as_str(), 3)], 62_500, None))
            .await
            .unwrap();
        assert_eq!(receipt.item_count, 2);
        assert_eq!(stock_of(&db, &t, &kape.id).await, 0);
    }

    #[tokio::test]
    async fn test_payment_method_must_belong_to_tenant() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 5).await;
        let gcash = seed_payment_method(&db, &tenant("tenant-b"), "GCash").await;

        let mut request = sale(&[(kape.id.as_str(), 1)], 12_500, None);
        request.header.payment_method_id = Some(gcash.id.clone());

        let err = ledger(&db).record_sale(&t, request.clone()).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { ref entity, .. } if entity == "PaymentMethod"));
        assert_eq!(stock_of(&db, &t, &kape.id).await, 5);

        let cash = seed_payment_method(&db, &t, "Cash").await;
        request.header.payment_method_id = Some(cash.id);
        assert!(ledger(&db).record_sale(&t, request).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_requests_are_rejected_before_storage() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 5).await;

        let empty = sale(&[], 12_500, None);
        assert!(matches!(
            ledger(&db).record_sale(&t, empty).await,
            Err(LedgerError::Validation(_))
        ));

        let zero_qty = sale(&[(kape.id.as_str(), 0)], 12_500, None);
        assert!(matches!(
            ledger(&db).record_sale(&t, zero_qty).await,
            Err(LedgerError::Validation(_))
        ));

        let mut bad_email = sale(&[(kape.id.as_str(), 1)], 12_500, None);
        bad_email.header.email_to = Some("not-an-email".to_string());
        assert!(matches!(
            ledger(&db).record_sale(&t, bad_email).await,
            Err(LedgerError::Validation(_))
        ));

        assert_eq!(stock_of(&db, &t, &kape.id).await, 5);
    }

    #[tokio::test]
    async fn test_client_timestamp_is_normalized_not_trusted() {
        let db = memory_db().await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 5).await;

        let mut request = sale(&[(kape.id.as_str(), 1)], 12_500, Some(10_000));
        request.header.client_timestamp = Some("2020-03-01 09:30:00".to_string());
        request.header.email_to = Some("   ".to_string());

        let receipt = ledger(&db).record_sale(&t, request).await.unwrap();
        // Cash short of the total is recorded; change floors at zero
        assert_eq!(receipt.change_cents, Some(0));

        let mut store = db.begin(&t).await.unwrap();
        let txn = store.transactions().get(&receipt.transaction_id).await.unwrap();
        let reported = txn.client_reported_at.unwrap();
        assert_eq!(reported.to_rfc3339(), "2020-03-01T01:30:00+00:00");
        assert!(txn.created_at > reported);
        assert_eq!(txn.email_to, None);
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_db(&dir, 4).await;
        let t = tenant("tenant-a");
        let kape = seed_product(&db, &t, "KAPE-250", 12_500, 10).await;

        let ledger = Arc::new(ledger(&db));
        let mut handles = Vec::new();
        for _ in 0..25 {
            let ledger = Arc::clone(&ledger);
            let t = t.clone();
            let request = sale(&[(kape.id.as_str(), 1)], 12_500, None);
            handles.push(tokio::spawn(async move { ledger.record_sale(&t, request).await }));
        }

        let mut sold = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(LedgerError::InsufficientStock { .. }) => refused += 1,
                Err(other) => panic!("unexpected {other:?}"),
            }
        }

        assert_eq!(sold, 10);
        assert_eq!(refused, 15);
        assert_eq!(stock_of(&db, &t, &kape.id).await, 0);
        assert_eq!(transaction_count(&db, &t).await, 10);
    }
}
