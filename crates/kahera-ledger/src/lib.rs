//! # kahera-ledger: Sales Ledger Services
//!
//! Atomic business operations over the tenant-scoped store.
//!
//! ## Module Organization
//! ```text
//! kahera_ledger/
//! ├── lib.rs       ◄─── Ledger facade, execute(), init_tracing()
//! ├── command.rs   ◄─── LedgerCommand / LedgerResponse
//! ├── sales.rs     ◄─── record_sale
//! ├── refunds.rs   ◄─── create_refund, restock policy
//! ├── stock.rs     ◄─── adjust_stock, restock history
//! ├── catalog.rs   ◄─── products, payment methods
//! ├── reports.rs   ◄─── transaction listing, sales/inventory reports
//! ├── config.rs    ◄─── LedgerConfig from the environment
//! └── error.rs     ◄─── LedgerError, ErrorCode
//! ```
//!
//! ## Services Share One Database Handle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Ledger                                     │
//! │                                                                         │
//! │  ┌─────────────┐ ┌───────────────┐ ┌──────────────┐ ┌─────────┐ ┌─────┐ │
//! │  │ SalesLedger │ │ RefundService │ │ StockService │ │ Catalog │ │Rpts │ │
//! │  └──────┬──────┘ └───────┬───────┘ └──────┬───────┘ └────┬────┘ └──┬──┘ │
//! │         └────────────────┴───────┬────────┴──────────────┴─────────┘    │
//! │                                  ▼                                      │
//! │                   Database (cloned pool handle)                         │
//! │                     db.begin(&tenant) → TenantStore                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! kahera_ledger::init_tracing();
//!
//! let ledger = Ledger::open(LedgerConfig::load()?).await?;
//! let tenant = TenantId::parse("sari-sari-01")?;
//!
//! let command = LedgerCommand::from_json(body)?;
//! let response = ledger.execute(&tenant, command).await?;
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod refunds;
pub mod reports;
pub mod sales;
pub mod stock;

#[cfg(test)]
mod test_support;

use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kahera_core::TenantId;
use kahera_db::Database;

pub use catalog::Catalog;
pub use command::{LedgerCommand, LedgerResponse};
pub use config::{ConfigError, LedgerConfig, RestockPolicy};
pub use error::{ErrorBody, ErrorCode, LedgerError, LedgerResult};
pub use refunds::RefundService;
pub use reports::Reports;
pub use sales::SalesLedger;
pub use stock::StockService;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,kahera=debug,sqlx=warn";

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Calling this more than once
/// is harmless: later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Every ledger service behind one handle.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    config: LedgerConfig,
    sales: SalesLedger,
    refunds: RefundService,
    stock: StockService,
    catalog: Catalog,
    reports: Reports,
}

impl Ledger {
    /// Connects to the configured database (running migrations) and wires
    /// up the services.
    pub async fn open(config: LedgerConfig) -> LedgerResult<Self> {
        info!(
            path = %config.database_path.display(),
            restock_policy = ?config.restock_policy,
            "Opening ledger"
        );
        let db = Database::new(config.db_config()).await?;
        Ok(Self::with_database(db, config))
    }

    pub fn with_database(db: Database, config: LedgerConfig) -> Self {
        Ledger {
            sales: SalesLedger::new(db.clone(), config.utc_offset),
            refunds: RefundService::new(db.clone(), config.restock_policy),
            stock: StockService::new(db.clone()),
            catalog: Catalog::new(db.clone()),
            reports: Reports::new(db.clone(), config.utc_offset, config.currency.clone()),
            db,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn sales(&self) -> &SalesLedger {
        &self.sales
    }

    pub fn refunds(&self) -> &RefundService {
        &self.refunds
    }

    pub fn stock(&self) -> &StockService {
        &self.stock
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn reports(&self) -> &Reports {
        &self.reports
    }

    /// Runs one command for `tenant`.
    pub async fn execute(
        &self,
        tenant: &TenantId,
        command: LedgerCommand,
    ) -> LedgerResult<LedgerResponse> {
        debug!(tenant = %tenant, write = command.is_write(), "Executing ledger command");

        let response = match command {
            LedgerCommand::RecordSale(request) => {
                LedgerResponse::SaleRecorded(self.sales.record_sale(tenant, request).await?)
            }
            LedgerCommand::CreateRefund(request) => {
                LedgerResponse::RefundCreated(self.refunds.create_refund(tenant, request).await?)
            }
            LedgerCommand::AdjustStock(request) => {
                LedgerResponse::StockAdjusted(self.stock.adjust_stock(tenant, request).await?)
            }
            LedgerCommand::CreateProduct(new) => {
                LedgerResponse::Product(self.catalog.create_product(tenant, new).await?)
            }
            LedgerCommand::UpdateProduct { id, update } => {
                LedgerResponse::Product(self.catalog.update_product(tenant, &id, update).await?)
            }
            LedgerCommand::DeleteProduct { id } => {
                self.catalog.delete_product(tenant, &id).await?;
                LedgerResponse::ProductDeleted { id }
            }
            LedgerCommand::CreatePaymentMethod { name } => {
                LedgerResponse::PaymentMethod(self.catalog.create_payment_method(tenant, &name).await?)
            }
            LedgerCommand::ListTransactions => {
                LedgerResponse::Transactions(self.reports.list_transactions(tenant).await?)
            }
            LedgerCommand::ListProducts => {
                LedgerResponse::Products(self.catalog.list_products(tenant).await?)
            }
            LedgerCommand::ListPaymentMethods => {
                LedgerResponse::PaymentMethods(self.catalog.list_payment_methods(tenant).await?)
            }
            LedgerCommand::RestockHistory => {
                LedgerResponse::StockAdjustments(self.stock.restock_history(tenant).await?)
            }
            LedgerCommand::SalesReport { range } => LedgerResponse::SalesReport(
                self.reports.sales_report(tenant, range, Utc::now()).await?,
            ),
            LedgerCommand::InventoryReport => {
                LedgerResponse::Inventory(self.reports.inventory_report(tenant, Utc::now()).await?)
            }
        };

        Ok(response)
    }

    /// Closes the connection pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
