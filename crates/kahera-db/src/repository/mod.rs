//! # Repository Module
//!
//! Tenant-scoped repositories. Each one borrows the connection of an open
//! [`TenantStore`](crate::store::TenantStore) together with its tenant id.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Tenant-Scoped Repositories                           │
//! │                                                                         │
//! │  SalesLedger                                                           │
//! │       │                                                                 │
//! │       │  store.products().decrement_stock(id, 4, now)                  │
//! │       ▼                                                                 │
//! │  ProductRepository<'s>                                                 │
//! │  ├── conn:   &'s mut SqliteConnection   (inside the open transaction)  │
//! │  └── tenant: &'s TenantId                                              │
//! │       │                                                                 │
//! │       │  UPDATE products SET stock = stock - ?                         │
//! │       │   WHERE id = ? AND tenant_id = ? AND stock >= ?                │
//! │       ▼                                                                 │
//! │  SQLite                                                                │
//! │                                                                         │
//! │  Every statement conjoins `tenant_id = ?`. An id owned by another      │
//! │  tenant is indistinguishable from a missing one.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog and stock
//! - [`TransactionRepository`](transaction::TransactionRepository) - Sale headers
//! - [`LineItemRepository`](line_item::LineItemRepository) - Snapshot lines
//! - [`RefundRepository`](refund::RefundRepository) - Balance-checked refunds
//! - [`StockAdjustmentRepository`](stock_adjustment::StockAdjustmentRepository) - Restock log
//! - [`PaymentMethodRepository`](payment_method::PaymentMethodRepository) - Payment methods

pub mod line_item;
pub mod payment_method;
pub mod product;
pub mod refund;
pub mod stock_adjustment;
pub mod transaction;
