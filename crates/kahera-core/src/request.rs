//! # Request Types
//!
//! Strictly typed bodies for every write operation.
//!
//! Each type rejects unknown fields at deserialization and exposes a
//! `validate()` that runs before any storage access. A request that fails
//! either step never reaches the store.
//!
//! ```text
//! JSON ──serde (deny_unknown_fields)──► RecordSaleRequest ──validate()──► SalesLedger
//!          │                                                   │
//!          └── malformed: rejected                              └── out of range: rejected
//! ```

use chrono::{NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::time::parse_client_timestamp;
use crate::validation::{
    validate_code, validate_description, validate_email, validate_line_item_count,
    validate_positive_amount, validate_price_cents, validate_product_name, validate_quantity,
    validate_reason, validate_reference_number, validate_restock_delta, validate_stock_level,
    validate_uuid, ValidationResult,
};

/// Treats a missing or whitespace-only optional string as absent.
///
/// Web forms submit empty inputs as `""`; the ledger stores those as NULL.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Sales
// =============================================================================

/// Sale header as submitted by the register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct SaleHeader {
    pub payment_method_id: Option<String>,
    pub cash_received_cents: Option<i64>,
    /// Total the register computed; must match the server's snapshot total.
    pub total_price_cents: i64,
    pub email_to: Option<String>,
    pub reference_number: Option<String>,
    /// The register's clock. Kept for reference only.
    pub client_timestamp: Option<String>,
}

impl SaleHeader {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive_amount("total_price", self.total_price_cents)?;

        if let Some(cash) = self.cash_received_cents {
            validate_price_cents("cash_received", cash)?;
        }
        if let Some(id) = non_blank(&self.payment_method_id) {
            validate_uuid("payment_method_id", id)?;
        }
        if let Some(email) = non_blank(&self.email_to) {
            validate_email(email)?;
        }
        if let Some(reference) = non_blank(&self.reference_number) {
            validate_reference_number(reference)?;
        }
        if let Some(raw) = non_blank(&self.client_timestamp) {
            // Format check only; the tenant offset is applied by the ledger.
            parse_client_timestamp(raw, Utc.fix())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("product_id", &self.product_id)?;
        validate_quantity(self.quantity)
    }
}

/// `record_sale` input: a header plus an ordered, non-empty list of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct RecordSaleRequest {
    pub header: SaleHeader,
    pub items: Vec<LineItemRequest>,
}

impl RecordSaleRequest {
    /// Validates everything that can be checked without reading the store.
    ///
    /// ## Example
    /// ```rust
    /// use kahera_core::{LineItemRequest, RecordSaleRequest, SaleHeader};
    ///
    /// let request = RecordSaleRequest {
    ///     header: SaleHeader {
    ///         payment_method_id: None,
    ///         cash_received_cents: Some(100_000),
    ///         total_price_cents: 50_000,
    ///         email_to: None,
    ///         reference_number: None,
    ///         client_timestamp: None,
    ///     },
    ///     items: vec![],
    /// };
    /// assert!(request.validate().is_err()); // no items
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        validate_line_item_count(self.items.len())?;
        self.header.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

// =============================================================================
// Refunds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct RefundRequest {
    pub transaction_id: String,
    pub amount_cents: i64,
    pub reason: Option<String>,
}

impl RefundRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("transaction_id", &self.transaction_id)?;
        validate_positive_amount("amount", self.amount_cents)?;
        if let Some(reason) = &self.reason {
            validate_reason(reason)?;
        }
        Ok(())
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Restock request. `delta` must be positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct AdjustStockRequest {
    pub product_id: String,
    pub delta: i64,
    pub reason: Option<String>,
}

impl AdjustStockRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid("product_id", &self.product_id)?;
        validate_restock_delta(self.delta)?;
        if let Some(reason) = &self.reason {
            validate_reason(reason)?;
        }
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
    /// Opening stock. Later changes go through sales and restocks only.
    #[serde(default)]
    pub stock: i64,
    pub low_stock_level: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_code(&self.code)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_price_cents("buy_price", self.buy_price_cents)?;
        validate_price_cents("sell_price", self.sell_price_cents)?;
        validate_stock_level("stock", self.stock)?;
        if let Some(level) = self.low_stock_level {
            validate_stock_level("low_stock_level", level)?;
        }
        Ok(())
    }
}

/// Replaces a product's editable details.
///
/// Stock is absent: it only moves through sales and restocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
    pub low_stock_level: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
}

impl ProductUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_code(&self.code)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_price_cents("buy_price", self.buy_price_cents)?;
        validate_price_cents("sell_price", self.sell_price_cents)?;
        if let Some(level) = self.low_stock_level {
            validate_stock_level("low_stock_level", level)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    const PRODUCT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn header() -> SaleHeader {
        SaleHeader {
            payment_method_id: None,
            cash_received_cents: Some(60_000),
            total_price_cents: 50_000,
            email_to: None,
            reference_number: None,
            client_timestamp: None,
        }
    }

    fn sale(items: Vec<LineItemRequest>) -> RecordSaleRequest {
        RecordSaleRequest {
            header: header(),
            items,
        }
    }

    fn line(quantity: i64) -> LineItemRequest {
        LineItemRequest {
            product_id: PRODUCT_ID.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_valid_sale() {
        assert!(sale(vec![line(4)]).validate().is_ok());
    }

    #[test]
    fn test_sale_rejects_bad_lines() {
        assert!(matches!(
            sale(vec![]).validate(),
            Err(ValidationError::Required { .. })
        ));
        assert!(sale(vec![line(0)]).validate().is_err());
        assert!(sale(vec![line(-2)]).validate().is_err());
        assert!(sale(vec![line(1000)]).validate().is_err());
        assert!(sale(vec![line(1); crate::MAX_LINE_ITEMS + 1]).validate().is_err());
    }

    #[test]
    fn test_sale_header_rules() {
        let mut h = header();
        h.total_price_cents = 0;
        assert!(h.validate().is_err());

        let mut h = header();
        h.cash_received_cents = Some(-1);
        assert!(h.validate().is_err());

        let mut h = header();
        h.email_to = Some("nope".to_string());
        assert!(h.validate().is_err());

        let mut h = header();
        h.email_to = Some("  ".to_string());
        h.client_timestamp = Some("2026-03-01 14:30:00".to_string());
        assert!(h.validate().is_ok());

        let mut h = header();
        h.client_timestamp = Some("last tuesday".to_string());
        assert!(h.validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let json = r#"{
            "header": { "totalPriceCents": 500, "status": "refunded" },
            "items": [{ "productId": "x", "quantity": 1 }]
        }"#;
        assert!(serde_json::from_str::<RecordSaleRequest>(json).is_err());

        let json = r#"{
            "header": { "totalPriceCents": 500 },
            "items": [{ "productId": "x", "quantity": 1 }]
        }"#;
        let parsed: RecordSaleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.header.payment_method_id, None);
        assert_eq!(parsed.items.len(), 1);
    }

    #[test]
    fn test_refund_request() {
        let request = RefundRequest {
            transaction_id: PRODUCT_ID.to_string(),
            amount_cents: 20_000,
            reason: Some("wrong size".to_string()),
        };
        assert!(request.validate().is_ok());

        let mut bad = request.clone();
        bad.amount_cents = 0;
        assert!(bad.validate().is_err());

        let mut bad = request;
        bad.reason = Some("x".repeat(crate::MAX_REASON_LENGTH + 1));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_adjust_stock_request() {
        let request = AdjustStockRequest {
            product_id: PRODUCT_ID.to_string(),
            delta: 24,
            reason: None,
        };
        assert!(request.validate().is_ok());

        let mut negative = request;
        negative.delta = -5;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_new_product_defaults_stock() {
        let json = r#"{
            "name": "Pandesal (6 pcs)",
            "code": "PANDESAL-6",
            "buyPriceCents": 1500,
            "sellPriceCents": 2500,
            "expirationDate": "2026-03-05"
        }"#;
        let product: NewProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.stock, 0);
        assert_eq!(product.expiration_date, NaiveDate::from_ymd_opt(2026, 3, 5));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  x ".to_string())), Some("x"));
        assert_eq!(non_blank(&Some("   ".to_string())), None);
        assert_eq!(non_blank(&None), None);
    }
}
