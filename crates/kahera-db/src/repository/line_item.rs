//! # Line Item Repository
//!
//! ## Snapshot Pattern
//! Product name, sell price and buy price are copied into the line item at
//! the moment of sale. Later catalog edits never reach these rows, and no
//! total is ever recomputed from `products`.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use kahera_core::{LineItem, Product, TenantId};

pub struct LineItemRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> LineItemRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        LineItemRepository { conn, tenant }
    }

    /// Inserts a line item snapshotting `product`.
    pub async fn insert(
        &mut self,
        transaction_id: &str,
        product: &Product,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<LineItem> {
        let id = Uuid::new_v4().to_string();

        debug!(
            tenant = %self.tenant,
            transaction_id = %transaction_id,
            product_id = %product.id,
            quantity,
            "Inserting line item"
        );

        let item = sqlx::query_as::<_, LineItem>(
            r#"
            INSERT INTO line_items (
                id, tenant_id, transaction_id, product_id,
                product_name, quantity,
                unit_sell_price_cents, unit_buy_price_cents,
                created_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8,
                ?9
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(transaction_id)
        .bind(&product.id)
        .bind(&product.name)
        .bind(quantity)
        .bind(product.sell_price_cents)
        .bind(product.buy_price_cents)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(item)
    }

    /// Items of one transaction, in the order they were rung up.
    pub async fn list_for_transaction(&mut self, transaction_id: &str) -> DbResult<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT * FROM line_items
            WHERE transaction_id = ?1 AND tenant_id = ?2
            ORDER BY rowid
            "#,
        )
        .bind(transaction_id)
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }

    /// Every line item of the tenant, grouped by transaction in insertion order.
    pub async fn list(&mut self) -> DbResult<Vec<LineItem>> {
        debug!(tenant = %self.tenant, "Listing line items");

        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT * FROM line_items
            WHERE tenant_id = ?1
            ORDER BY transaction_id, rowid
            "#,
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }
}
