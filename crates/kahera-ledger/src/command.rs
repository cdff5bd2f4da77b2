//! # Ledger Commands
//!
//! The strictly typed request enum the HTTP boundary deserializes into.
//!
//! ```text
//! {"type": "record_sale", "header": {...}, "items": [...]}
//!      │
//!      ▼  serde: unknown "type" or unknown field → rejected here
//! LedgerCommand::RecordSale(RecordSaleRequest)
//!      │
//!      ▼  Ledger::execute(tenant, command)
//! LedgerResponse::SaleRecorded(SaleReceipt)
//! ```

use serde::{Deserialize, Serialize};

use kahera_core::report::{DateRange, InventoryOverview, SalesReport};
use kahera_core::{
    AdjustStockRequest, NewProduct, PaymentMethod, Product, ProductUpdate, RecordSaleRequest,
    RefundOutcome, RefundRequest, SaleReceipt, StockAdjustment, TransactionSummary,
    ValidationError,
};

use crate::error::LedgerResult;

/// Every operation the ledger accepts, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum LedgerCommand {
    RecordSale(RecordSaleRequest),
    CreateRefund(RefundRequest),
    AdjustStock(AdjustStockRequest),
    CreateProduct(NewProduct),
    UpdateProduct {
        id: String,
        update: ProductUpdate,
    },
    DeleteProduct {
        id: String,
    },
    CreatePaymentMethod {
        name: String,
    },
    ListTransactions,
    ListProducts,
    ListPaymentMethods,
    RestockHistory,
    SalesReport {
        #[serde(default)]
        range: DateRange,
    },
    InventoryReport,
}

impl LedgerCommand {
    /// Parses a JSON body. Malformed bodies are validation failures.
    pub fn from_json(raw: &str) -> LedgerResult<Self> {
        serde_json::from_str(raw).map_err(|e| {
            ValidationError::InvalidFormat {
                field: "body".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Whether executing this command can change the ledger.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            LedgerCommand::RecordSale(_)
                | LedgerCommand::CreateRefund(_)
                | LedgerCommand::AdjustStock(_)
                | LedgerCommand::CreateProduct(_)
                | LedgerCommand::UpdateProduct { .. }
                | LedgerCommand::DeleteProduct { .. }
                | LedgerCommand::CreatePaymentMethod { .. }
        )
    }
}

/// What a successful command returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LedgerResponse {
    SaleRecorded(SaleReceipt),
    RefundCreated(RefundOutcome),
    StockAdjusted(Product),
    Product(Product),
    ProductDeleted { id: String },
    PaymentMethod(PaymentMethod),
    Transactions(Vec<TransactionSummary>),
    Products(Vec<Product>),
    PaymentMethods(Vec<PaymentMethod>),
    StockAdjustments(Vec<StockAdjustment>),
    SalesReport(SalesReport),
    Inventory(InventoryOverview),
}

// =============================================================================
// Unit Tests
// =============================================================================
