//! # Tenant-Scoped Store
//!
//! The unit of work every ledger operation runs inside.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     TenantStore = BEGIN … COMMIT                        │
//! │                                                                         │
//! │  let mut store = db.begin(&tenant).await?;      ── BEGIN                │
//! │       │                                                                 │
//! │       ├── store.products().decrement_stock(..)  ┐                       │
//! │       ├── store.transactions().insert(..)       ├ same connection,     │
//! │       ├── store.line_items().insert(..)         ┘ same tenant          │
//! │       │                                                                 │
//! │       ├── Err(e)? ── store dropped ──────────────── ROLLBACK            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.commit().await?                          ── COMMIT               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - The tenant is fixed when the store is opened; repositories cannot be
//!   pointed at another one.
//! - Dropping the store without [`TenantStore::commit`] rolls back.
//! - While a store is open it owns one pool connection. Code holding a
//!   store must not open a second one on the same pool: an in-memory
//!   database has exactly one connection.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::line_item::LineItemRepository;
use crate::repository::payment_method::PaymentMethodRepository;
use crate::repository::product::ProductRepository;
use crate::repository::refund::RefundRepository;
use crate::repository::stock_adjustment::StockAdjustmentRepository;
use crate::repository::transaction::TransactionRepository;
use kahera_core::TenantId;

/// An open storage transaction bound to one tenant.
pub struct TenantStore {
    tx: Transaction<'static, Sqlite>,
    tenant: TenantId,
}

impl TenantStore {
    pub(crate) async fn begin(pool: &SqlitePool, tenant: TenantId) -> DbResult<Self> {
        let tx = pool.begin().await?;
        debug!(tenant = %tenant, "Unit of work opened");
        Ok(TenantStore { tx, tenant })
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn products(&mut self) -> ProductRepository<'_> {
        ProductRepository::new(&mut self.tx, &self.tenant)
    }

    pub fn transactions(&mut self) -> TransactionRepository<'_> {
        TransactionRepository::new(&mut self.tx, &self.tenant)
    }

    pub fn line_items(&mut self) -> LineItemRepository<'_> {
        LineItemRepository::new(&mut self.tx, &self.tenant)
    }

    pub fn refunds(&mut self) -> RefundRepository<'_> {
        RefundRepository::new(&mut self.tx, &self.tenant)
    }

    pub fn stock_adjustments(&mut self) -> StockAdjustmentRepository<'_> {
        StockAdjustmentRepository::new(&mut self.tx, &self.tenant)
    }

    pub fn payment_methods(&mut self) -> PaymentMethodRepository<'_> {
        PaymentMethodRepository::new(&mut self.tx, &self.tenant)
    }

    /// Makes every write of this unit durable.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!(tenant = %self.tenant, "Unit of work committed");
        Ok(())
    }

    /// Discards every write of this unit. Dropping the store does the same.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!(tenant = %self.tenant, "Unit of work rolled back");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
