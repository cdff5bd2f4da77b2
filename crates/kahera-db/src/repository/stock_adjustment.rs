//! # Stock Adjustment Repository
//!
//! Append-only log of restocks, including refund restocks.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kahera_core::{StockAdjustment, TenantId};

pub struct StockAdjustmentRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> StockAdjustmentRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        StockAdjustmentRepository { conn, tenant }
    }

    pub async fn insert(
        &mut self,
        product_id: &str,
        delta: i64,
        reason: Option<&str>,
        stock_after: i64,
        now: DateTime<Utc>,
    ) -> DbResult<StockAdjustment> {
        let id = Uuid::new_v4().to_string();

        debug!(
            tenant = %self.tenant,
            product_id = %product_id,
            delta,
            stock_after,
            "Logging stock adjustment"
        );

        let adjustment = sqlx::query_as::<_, StockAdjustment>(
            r#"
            INSERT INTO stock_adjustments (
                id, tenant_id, product_id, delta, reason, stock_after, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(product_id)
        .bind(delta)
        .bind(reason)
        .bind(stock_after)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(adjustment)
    }

    /// The tenant's restock history, newest first.
    pub async fn list(&mut self) -> DbResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT * FROM stock_adjustments
            WHERE tenant_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(adjustments)
    }

    pub async fn list_for_product(&mut self, product_id: &str) -> DbResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(
            r#"
            SELECT * FROM stock_adjustments
            WHERE product_id = ?1 AND tenant_id = ?2
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(product_id)
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(adjustments)
    }
}
