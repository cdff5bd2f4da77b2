//! # Payment Method Repository

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kahera_core::{PaymentMethod, TenantId};

pub struct PaymentMethodRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> PaymentMethodRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        PaymentMethodRepository { conn, tenant }
    }

    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(method)
    }

    pub async fn list(&mut self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            "SELECT * FROM payment_methods WHERE tenant_id = ?1 ORDER BY name, id",
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(methods)
    }

    /// ## Errors
    /// `UniqueViolation` if the tenant already has a method with this name.
    pub async fn insert(&mut self, name: &str, now: DateTime<Utc>) -> DbResult<PaymentMethod> {
        let id = Uuid::new_v4().to_string();
        let name = name.trim();

        debug!(tenant = %self.tenant, id = %id, name = %name, "Inserting payment method");

        sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (id, tenant_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(name)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("payment method", name),
            other => other,
        })
    }

    /// ## Errors
    /// `ForeignKeyViolation` while transactions still reference the method.
    pub async fn delete_by_id(&mut self, id: &str) -> DbResult<()> {
        debug!(tenant = %self.tenant, id = %id, "Deleting payment method");

        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1 AND tenant_id = ?2")
            .bind(id)
            .bind(self.tenant.as_str())
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", id));
        }

        Ok(())
    }
}
