//! # Product Repository
//!
//! Catalog rows and the two stock mutations.
//!
//! ## Conditional Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Check-and-decrement in ONE statement                    │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │     SET stock = stock - :qty                                            │
//! │   WHERE id = :id AND tenant_id = :tenant                                │
//! │     AND deleted_at IS NULL                                              │
//! │     AND stock >= :qty            ◄── the guard                          │
//! │  RETURNING *                                                            │
//! │                                                                         │
//! │  row returned  → decremented, row is the post-update snapshot           │
//! │  no row        → missing / other tenant / deleted / not enough stock    │
//! │                  (caller re-reads to tell which)                        │
//! │                                                                         │
//! │  Two registers selling the last unit: SQLite serializes the writes,     │
//! │  the second UPDATE sees stock = 0 and matches nothing.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kahera_core::request::non_blank;
use kahera_core::{NewProduct, Product, ProductUpdate, TenantId};

/// Tenant-scoped access to `products`.
///
/// Soft-deleted rows are invisible to every method.
pub struct ProductRepository<'s> {
    conn: &'s mut SqliteConnection,
    tenant: &'s TenantId,
}

impl<'s> ProductRepository<'s> {
    pub(crate) fn new(conn: &'s mut SqliteConnection, tenant: &'s TenantId) -> Self {
        ProductRepository { conn, tenant }
    }

    /// Gets a live product by ID.
    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Product>> {
        debug!(tenant = %self.tenant, id = %id, "Finding product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE id = ?1 AND tenant_id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(product)
    }

    /// Like [`find_by_id`](Self::find_by_id), but absence is an error.
    pub async fn get(&mut self, id: &str) -> DbResult<Product> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists the tenant's live products by name.
    pub async fn list(&mut self) -> DbResult<Vec<Product>> {
        debug!(tenant = %self.tenant, "Listing products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = ?1 AND deleted_at IS NULL
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .bind(self.tenant.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(products)
    }

    /// Inserts a new product for the tenant.
    ///
    /// ## Errors
    /// `UniqueViolation` if another live product of this tenant has the code.
    pub async fn insert(&mut self, new: &NewProduct, now: DateTime<Utc>) -> DbResult<Product> {
        let id = Uuid::new_v4().to_string();
        let code = new.code.trim();

        debug!(tenant = %self.tenant, id = %id, code = %code, "Inserting product");

        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, tenant_id, name, code, description,
                buy_price_cents, sell_price_cents, stock,
                low_stock_level, expiration_date,
                created_at, updated_at, deleted_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10,
                ?11, ?11, NULL
            )
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(self.tenant.as_str())
        .bind(new.name.trim())
        .bind(code)
        .bind(non_blank(&new.description))
        .bind(new.buy_price_cents)
        .bind(new.sell_price_cents)
        .bind(new.stock)
        .bind(new.low_stock_level)
        .bind(new.expiration_date)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| duplicate_code(e, code))
    }

    /// Replaces a product's editable details. Stock is left untouched.
    pub async fn update_by_id(
        &mut self,
        id: &str,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<Product> {
        let code = update.code.trim();

        debug!(tenant = %self.tenant, id = %id, "Updating product");

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = ?3,
                code = ?4,
                description = ?5,
                buy_price_cents = ?6,
                sell_price_cents = ?7,
                low_stock_level = ?8,
                expiration_date = ?9,
                updated_at = ?10
            WHERE id = ?1 AND tenant_id = ?2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .bind(update.name.trim())
        .bind(code)
        .bind(non_blank(&update.description))
        .bind(update.buy_price_cents)
        .bind(update.sell_price_cents)
        .bind(update.low_stock_level)
        .bind(update.expiration_date)
        .bind(now)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(|e| duplicate_code(e, code))?
        .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product.
    ///
    /// Line items keep pointing at the row; it just stops being visible.
    pub async fn delete_by_id(&mut self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        debug!(tenant = %self.tenant, id = %id, "Soft-deleting product");

        let result = sqlx::query(
            r#"
            UPDATE products SET deleted_at = ?3, updated_at = ?3
            WHERE id = ?1 AND tenant_id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .bind(now)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Takes `qty` units if, and only if, at least that many are on hand.
    ///
    /// Returns the updated row, or `None` when the guard matched nothing.
    pub async fn decrement_stock(
        &mut self,
        id: &str,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Product>> {
        debug!(tenant = %self.tenant, id = %id, qty, "Conditional stock decrement");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                stock = stock - ?3,
                updated_at = ?4
            WHERE id = ?1 AND tenant_id = ?2 AND deleted_at IS NULL
              AND stock >= ?3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .bind(qty)
        .bind(now)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(product)
    }

    /// Adds `delta` units. Returns `None` if the product is not visible.
    pub async fn increment_stock(
        &mut self,
        id: &str,
        delta: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Product>> {
        debug!(tenant = %self.tenant, id = %id, delta, "Stock increment");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                stock = stock + ?3,
                updated_at = ?4
            WHERE id = ?1 AND tenant_id = ?2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(self.tenant.as_str())
        .bind(delta)
        .bind(now)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(product)
    }
}

fn duplicate_code(err: sqlx::Error, code: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("code", code),
        other => other,
    }
}
