//! # Stock Service
//!
//! Restocks outside of sales. Each restock is a single increment plus an
//! entry in the stock adjustment log, which doubles as the restock history.

use chrono::Utc;
use tracing::{info, warn};

use kahera_core::request::non_blank;
use kahera_core::{AdjustStockRequest, Product, StockAdjustment, TenantId};
use kahera_db::Database;

use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    pub fn new(db: Database) -> Self {
        StockService { db }
    }

    /// Adds `delta` units to a product and logs the adjustment.
    ///
    /// ## Errors
    /// - `Validation`: `delta` not positive or above the restock ceiling
    /// - `NotFound`: unknown, deleted or cross-tenant product
    pub async fn adjust_stock(
        &self,
        tenant: &TenantId,
        request: AdjustStockRequest,
    ) -> LedgerResult<Product> {
        let result = self.try_adjust_stock(tenant, &request).await;

        match &result {
            Ok(product) => info!(
                tenant = %tenant,
                product_id = %product.id,
                delta = request.delta,
                stock = product.stock,
                "Stock adjusted"
            ),
            Err(e) => warn!(
                tenant = %tenant,
                product_id = %request.product_id,
                code = ?e.code(),
                error = %e,
                "Stock adjustment rejected"
            ),
        }

        result
    }

    async fn try_adjust_stock(
        &self,
        tenant: &TenantId,
        request: &AdjustStockRequest,
    ) -> LedgerResult<Product> {
        request.validate()?;
        let now = Utc::now();

        let mut store = self.db.begin(tenant).await?;

        let product = store
            .products()
            .increment_stock(&request.product_id, request.delta, now)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product", request.product_id.as_str()))?;

        store
            .stock_adjustments()
            .insert(
                &product.id,
                request.delta,
                non_blank(&request.reason),
                product.stock,
                now,
            )
            .await?;

        store.commit().await?;
        Ok(product)
    }

    /// Every stock adjustment of the tenant, newest first.
    pub async fn restock_history(&self, tenant: &TenantId) -> LedgerResult<Vec<StockAdjustment>> {
        let mut store = self.db.begin(tenant).await?;
        let history = store.stock_adjustments().list().await?;
        store.commit().await?;
        Ok(history)
    }

    /// Adjustments of one product, newest first.
    pub async fn product_history(
        &self,
        tenant: &TenantId,
        product_id: &str,
    ) -> LedgerResult<Vec<StockAdjustment>> {
        let mut store = self.db.begin(tenant).await?;
        store.products().get(product_id).await?;
        let history = store.stock_adjustments().list_for_product(product_id).await?;
        store.commit().await?;
        Ok(history)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
