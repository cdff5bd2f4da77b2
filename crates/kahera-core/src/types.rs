//! # Domain Types
//!
//! Core domain types used throughout the Kahera ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │    Refund       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (SKU)     │   │  total_price    │   │  transaction_id │       │
//! │  │  sell/buy price │   │  status ◄───────┼───┤  amount         │       │
//! │  │  stock ≥ 0      │   │  (derived)      │   │  (append-only)  │       │
//! │  └────────┬────────┘   └────────┬────────┘   └─────────────────┘       │
//! │           │ snapshot            │ 1..n                                  │
//! │           ▼                     ▼                                       │
//! │  ┌──────────────────────────────────────┐   ┌─────────────────┐        │
//! │  │              LineItem                │   │ StockAdjustment │        │
//! │  │  product_name / unit prices FROZEN   │   │  restock log    │        │
//! │  └──────────────────────────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenancy
//! Every persisted entity carries `tenant_id`. The store never returns an
//! entity whose tenant differs from the caller's.
//!
//! ## Money fields
//! Amounts are stored as `*_cents: i64` columns and exposed as [`Money`]
//! through accessor methods.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::EXPIRY_WARNING_DAYS;

// =============================================================================
// Tenant
// =============================================================================

/// Opaque identifier of the authenticated caller.
///
/// Issued by the external identity provider; the ledger only requires it to
/// be a non-empty token without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    /// Maximum accepted length of a tenant identifier.
    pub const MAX_LEN: usize = 128;

    /// Parses and validates a tenant identifier.
    ///
    /// ## Example
    /// ```rust
    /// use kahera_core::TenantId;
    ///
    /// assert!(TenantId::parse("user_2abc").is_ok());
    /// assert!(TenantId::parse("  ").is_err());
    /// ```
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "tenant_id".to_string(),
            });
        }
        if raw.len() > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "tenant_id".to_string(),
                max: Self::MAX_LEN,
            });
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidFormat {
                field: "tenant_id".to_string(),
                reason: "must not contain whitespace".to_string(),
            });
        }
        Ok(TenantId(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TenantId::parse(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in a tenant's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Display name shown to cashier and on receipts.
    pub name: String,

    /// SKU code, unique per tenant.
    pub code: String,

    pub description: Option<String>,

    /// Purchase cost in centavos (for margin reporting).
    pub buy_price_cents: i64,

    /// Current selling price in centavos.
    pub sell_price_cents: i64,

    /// Units on hand. Never negative after a committed operation.
    pub stock: i64,

    /// At or below this level the product counts as low stock.
    pub low_stock_level: Option<i64>,

    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; deleted products are invisible to the store.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    #[inline]
    pub fn buy_price(&self) -> Money {
        Money::from_cents(self.buy_price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }

    /// Classifies the stock level against the low-stock threshold.
    ///
    /// A missing threshold counts as zero, so such products are either
    /// in stock or out of stock.
    pub fn stock_level(&self) -> StockLevel {
        if self.stock <= 0 {
            StockLevel::OutOfStock
        } else if self.stock <= self.low_stock_level.unwrap_or(0) {
            StockLevel::LowStock
        } else {
            StockLevel::InStock
        }
    }

    /// Classifies the expiration date relative to `today`.
    pub fn expiry_status(&self, today: NaiveDate) -> ExpiryStatus {
        match self.expiration_date {
            Some(date) if date < today => ExpiryStatus::Expired,
            Some(date) if date <= today + Duration::days(EXPIRY_WARNING_DAYS) => {
                ExpiryStatus::ExpiringSoon
            }
            _ => ExpiryStatus::Good,
        }
    }
}

/// Stock level buckets used by the inventory overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockLevel {
    InStock,
    LowStock,
    OutOfStock,
}

/// Expiration buckets used by the inventory overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ExpiryStatus {
    Expired,
    /// Expires within [`EXPIRY_WARNING_DAYS`].
    ExpiringSoon,
    /// Expires later, or has no expiration date.
    Good,
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Refund state of a transaction.
///
/// Never set by a client: it is a pure function of the recorded refunds,
/// see [`crate::ledger::derive_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransactionStatus {
    /// No refunds recorded.
    Active,
    /// Some, but not all, of the total has been refunded.
    PartiallyRefunded,
    /// The full total has been refunded.
    Refunded,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Active
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Active => "active",
            TransactionStatus::PartiallyRefunded => "partially_refunded",
            TransactionStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A sale header.
///
/// Created once by the sales ledger; afterwards only `status` and
/// `updated_at` ever change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub tenant_id: String,
    pub payment_method_id: Option<String>,
    /// Sum of line-item snapshot totals.
    pub total_price_cents: i64,
    pub cash_received_cents: Option<i64>,
    pub email_to: Option<String>,
    /// External confirmation number for non-cash payments.
    pub reference_number: Option<String>,
    pub status: TransactionStatus,
    /// What the client's clock said, normalized to UTC. Informational only.
    #[ts(as = "Option<String>")]
    pub client_reported_at: Option<DateTime<Utc>>,
    /// Server-assigned canonical timestamp of the sale.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    #[inline]
    pub fn cash_received(&self) -> Option<Money> {
        self.cash_received_cents.map(Money::from_cents)
    }

    /// Change owed to the customer for cash payments.
    pub fn change_due(&self) -> Option<Money> {
        self.cash_received()
            .map(|cash| cash.saturating_sub_to_zero(self.total_price()))
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub tenant_id: String,
    pub transaction_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Sell price at time of sale (frozen).
    pub unit_sell_price_cents: i64,
    /// Buy price at time of sale (frozen), for margin reporting.
    pub unit_buy_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    #[inline]
    pub fn unit_sell_price(&self) -> Money {
        Money::from_cents(self.unit_sell_price_cents)
    }

    /// quantity × unit sell price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_sell_price().multiply_quantity(self.quantity)
    }

    /// quantity × unit buy price.
    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.unit_buy_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Refund
// =============================================================================

/// A (possibly partial) refund against a transaction. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Refund {
    pub id: String,
    pub tenant_id: String,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Refund {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Stock Adjustment
// =============================================================================

/// One entry in the restock log. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustment {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    /// Signed change applied to stock.
    pub delta: i64,
    pub reason: Option<String>,
    /// Stock level right after this adjustment.
    pub stock_after: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// A tenant-defined payment method ("Cash", "GCash", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Read Models
// =============================================================================

/// A transaction as listed for display and export.
///
/// `items` are the snapshot line items; `total_refund_cents` and
/// `refund_reasons` are aggregates over the refund rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionSummary {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub payment_method_name: Option<String>,
    pub items: Vec<LineItem>,
    pub total_refund_cents: i64,
    /// Non-empty refund reasons joined with `"; "`.
    pub refund_reasons: Option<String>,
}

impl TransactionSummary {
    #[inline]
    pub fn total_refund(&self) -> Money {
        Money::from_cents(self.total_refund_cents)
    }

    /// Total minus refunds.
    pub fn net_total(&self) -> Money {
        self.transaction.total_price() - self.total_refund()
    }
}

/// Result of a successful `record_sale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleReceipt {
    pub transaction_id: String,
    pub total_price_cents: i64,
    /// Change due for cash payments.
    pub change_cents: Option<i64>,
    pub item_count: usize,
    pub success: bool,
}

/// Result of a successful `create_refund`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RefundOutcome {
    pub refund: Refund,
    pub new_status: TransactionStatus,
    pub total_refunded_cents: i64,
    pub remaining_cents: i64,
    /// Stock returned to inventory, when the restock policy applies.
    pub restocked: Vec<StockAdjustment>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, low: Option<i64>, expires: Option<NaiveDate>) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "Kape Barako 250g".to_string(),
            code: "KAPE-250".to_string(),
            description: None,
            buy_price_cents: 9_000,
            sell_price_cents: 12_500,
            stock,
            low_stock_level: low,
            expiration_date: expires,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_tenant_id_parse() {
        assert_eq!(TenantId::parse("user_2abc").unwrap().as_str(), "user_2abc");
        assert!(matches!(
            TenantId::parse(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            TenantId::parse("has space"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(TenantId::parse("x".repeat(TenantId::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_tenant_id_deserialize_validates() {
        let ok: TenantId = serde_json::from_str("\"user_1\"").unwrap();
        assert_eq!(ok.to_string(), "user_1");
        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
    }

    #[test]
    fn test_stock_level() {
        assert_eq!(product(0, Some(5), None).stock_level(), StockLevel::OutOfStock);
        assert_eq!(product(5, Some(5), None).stock_level(), StockLevel::LowStock);
        assert_eq!(product(6, Some(5), None).stock_level(), StockLevel::InStock);
        assert_eq!(product(1, None, None).stock_level(), StockLevel::InStock);
    }

    #[test]
    fn test_expiry_status() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let expired = product(1, None, NaiveDate::from_ymd_opt(2026, 2, 28));
        let soon = product(1, None, NaiveDate::from_ymd_opt(2026, 3, 31));
        let later = product(1, None, NaiveDate::from_ymd_opt(2026, 4, 1));
        assert_eq!(expired.expiry_status(today), ExpiryStatus::Expired);
        assert_eq!(soon.expiry_status(today), ExpiryStatus::ExpiringSoon);
        assert_eq!(later.expiry_status(today), ExpiryStatus::Good);
        assert_eq!(product(1, None, None).expiry_status(today), ExpiryStatus::Good);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TransactionStatus::PartiallyRefunded).unwrap();
        assert_eq!(json, "\"partially_refunded\"");
        assert_eq!(TransactionStatus::default(), TransactionStatus::Active);
    }

    #[test]
    fn test_line_item_totals() {
        let item = LineItem {
            id: "li-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            transaction_id: "tx-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Kape Barako 250g".to_string(),
            quantity: 4,
            unit_sell_price_cents: 12_500,
            unit_buy_price_cents: 9_000,
            created_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 50_000);
        assert_eq!(item.line_cost().cents(), 36_000);
    }
}
