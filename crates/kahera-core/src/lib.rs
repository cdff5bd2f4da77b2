//! # kahera-core: Pure Business Logic for the Kahera Ledger
//!
//! This crate holds the rules of the point-of-sale ledger as pure functions
//! and plain data types. Nothing in here touches a database, the network or
//! the system clock; callers pass `now` in explicitly.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kahera Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP boundary (auth, routing, JSON)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ LedgerCommand                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     kahera-ledger: SalesLedger, RefundService, StockService     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kahera-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  types  │ │  money  │ │  ledger  │ │ request │ │ report │  │   │
//! │  │   │ Product │ │  Money  │ │  status  │ │  Sale   │ │ totals │  │   │
//! │  │   │ Refund  │ │         │ │  refund  │ │ Refund  │ │ ranges │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           kahera-db (tenant-scoped store, SQLite)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, Transaction, LineItem, Refund, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Status derivation, refund bounds, sale totals
//! - [`request`] - Strictly typed request bodies and their validation
//! - [`validation`] - Field-level validators
//! - [`time`] - Timestamp normalization and tenant-local rendering
//! - [`report`] - Report aggregation over transaction summaries
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kahera_core::ledger::derive_status;
//! use kahera_core::{Money, TransactionStatus};
//!
//! let total = Money::from_cents(50_000);
//! assert_eq!(derive_status(total, Money::zero()), TransactionStatus::Active);
//! assert_eq!(
//!     derive_status(total, Money::from_cents(20_000)),
//!     TransactionStatus::PartiallyRefunded
//! );
//! assert_eq!(derive_status(total, total), TransactionStatus::Refunded);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod request;
pub mod time;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use request::{
    AdjustStockRequest, LineItemRequest, NewProduct, ProductUpdate, RecordSaleRequest,
    RefundRequest, SaleHeader,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest single restock delta accepted by `adjust_stock`.
pub const MAX_RESTOCK_QUANTITY: i64 = 100_000;

/// Maximum length of free-text reasons (refunds, stock adjustments).
pub const MAX_REASON_LENGTH: usize = 500;

/// Default tenant-local UTC offset in minutes (+08:00, Asia/Manila).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 480;

/// Products expiring within this many days are flagged as expiring soon.
pub const EXPIRY_WARNING_DAYS: i64 = 30;
