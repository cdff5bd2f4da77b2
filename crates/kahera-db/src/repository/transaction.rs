//! # Transaction Repository
//!
//! Sale headers. A header is written once by the sales ledger; afterwards
//! only `status` (and `updated_at`) ever change.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kahera_core::{TenantId, Transaction, TransactionStatus};

/// Header fields supplied by the sales ledger.
///
/// Id, tenant, status and timestamps are assigned by the repository.
#[derive(Debug, Clone, Default)]
pub struct NewTransaction {
    pub payment_method_id: Option<String>,
    pub total_price_cents: i64,
    pub cash_received_cents: Option<i64>,
    pub email_to: Option<String>,
    pub reference_number: Option<String>,
    pub client_reported_at: Option<DateTime<Utc>>,
}

/// A header joined with its payment method's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionWithPaymentMethod {
    #[sqlx(flatten)]
    pub transaction: Transaction,
    pub payment_method_name: Option<String>,
}

pub struct TransactionRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> TransactionRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        TransactionRepository { conn, tenant }
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Transaction>> {
        debug!(tenant = %self.tenant, id = %id, "Finding transaction");

        let transaction = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(transaction)
    }

    pub async fn get(&mut self, id: &str) -> DbResult<Transaction> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))
    }

    /// Inserts a header with `status = active` and a server timestamp.
    pub async fn insert(&mut self, new: &NewTransaction, now: DateTime<Utc>) -> DbResult<Transaction> {
        let id = Uuid::new_v4().to_string();

        debug!(
            tenant = %self.tenant,
            id = %id,
            total_cents = new.total_price_cents,
            "Inserting transaction"
        );

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                id, tenant_id, payment_method_id,
                total_price_cents, cash_received_cents,
                email_to, reference_number, status,
                client_reported_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?10
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(&new.payment_method_id)
        .bind(new.total_price_cents)
        .bind(new.cash_received_cents)
        .bind(&new.email_to)
        .bind(&new.reference_number)
        .bind(TransactionStatus::Active)
        .bind(new.client_reported_at)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(transaction)
    }

    /// Headers joined with payment method names, newest first.
    pub async fn list_with_payment_method(&mut self) -> DbResult<Vec<TransactionWithPaymentMethod>> {
        debug!(tenant = %self.tenant, "Listing transactions");

        let rows = sqlx::query_as::<_, TransactionWithPaymentMethod>(
            r#"
            SELECT t.*, pm.name AS payment_method_name
            FROM transactions t
            LEFT JOIN payment_methods pm
                   ON pm.id = t.payment_method_id AND pm.tenant_id = t.tenant_id
            WHERE t.tenant_id = ?1
            ORDER BY t.created_at DESC, t.id
            "#,
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(rows)
    }

    /// Writes a recomputed status.
    pub async fn update_status(
        &mut self,
        id: &str,
        status: TransactionStatus,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(tenant = %self.tenant, id = %id, status = %status, "Updating transaction status");

        let result = sqlx::query(
            r#"
            UPDATE transactions SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .bind(status)
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }
}
