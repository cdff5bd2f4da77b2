//! # Refund Repository
//!
//! Refund rows are append-only. The insert carries the refund bound in its
//! own `WHERE` clause, so two concurrent refunds can never both squeeze
//! under the remaining balance.
//!
//! ```text
//! INSERT INTO refunds (...)
//! SELECT ... FROM transactions t
//!  WHERE t.id = :txn AND t.tenant_id = :tenant
//!    AND Σ(existing refunds) + :amount <= t.total_price_cents
//!
//! 1 row  → accepted
//! 0 rows → transaction missing for this tenant, or over the bound
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kahera_core::{Refund, TenantId};

pub struct RefundRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> RefundRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        RefundRepository { conn, tenant }
    }

    /// Inserts a refund only if it fits in the transaction's remaining
    /// refundable balance. `None` means nothing was written.
    pub async fn insert_within_balance(
        &mut self,
        transaction_id: &str,
        amount_cents: i64,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Refund>> {
        let id = Uuid::new_v4().to_string();

        debug!(
            tenant = %self.tenant,
            transaction_id = %transaction_id,
            amount_cents,
            "Conditional refund insert"
        );

        let refund = sqlx::query_as::<_, Refund>(
            r#"
            INSERT INTO refunds (id, tenant_id, transaction_id, amount_cents, reason, created_at)
            SELECT ?1, ?2, t.id, ?3, ?4, ?5
            FROM transactions t
            WHERE t.id = ?6 AND t.tenant_id = ?2
              AND (
                  SELECT COALESCE(SUM(r.amount_cents), 0)
                  FROM refunds r
                  WHERE r.transaction_id = t.id AND r.tenant_id = ?2
              ) + ?3 <= t.total_price_cents
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(amount_cents)
        .bind(reason)
        .bind(now)
        .bind(transaction_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(refund)
    }

    /// Sum of all refunds recorded against a transaction.
    pub async fn total_for_transaction(&mut self, transaction_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM refunds
            WHERE transaction_id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(transaction_id)
        .bind(self.tenant.as_str())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(total)
    }

    pub async fn list_for_transaction(&mut self, transaction_id: &str) -> DbResult<Vec<Refund>> {
        let refunds = sqlx::query_as::<_, Refund>(
            r#"
            SELECT * FROM refunds
            WHERE transaction_id = ?1 AND tenant_id = ?2
            ORDER BY created_at, rowid
            "#,
        )
        .bind(transaction_id)
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(refunds)
    }

    /// Every refund of the tenant, oldest first.
    pub async fn list(&mut self) -> DbResult<Vec<Refund>> {
        debug!(tenant = %self.tenant, "Listing refunds");

        let refunds = sqlx::query_as::<_, Refund>(
            r#"
            SELECT * FROM refunds
            WHERE tenant_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(refunds)
    }
}
