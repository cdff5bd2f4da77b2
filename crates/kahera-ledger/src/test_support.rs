//! Fixtures shared by the service tests.

use chrono::Utc;

use kahera_core::{
    LineItemRequest, NewProduct, PaymentMethod, Product, RecordSaleRequest, SaleHeader, TenantId,
};
use kahera_db::{Database, DbConfig};

pub(crate) const MISSING_ID: &str = "00000000-0000-4000-8000-000000000000";

pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database with a real multi-connection pool.
pub(crate) async fn file_db(dir: &tempfile::TempDir, max_connections: u32) -> Database {
    let config = DbConfig::new(dir.path().join("ledger.db")).max_connections(max_connections);
    Database::new(config).await.unwrap()
}

pub(crate) fn tenant(id: &str) -> TenantId {
    TenantId::parse(id).unwrap()
}

pub(crate) fn new_product(code: &str, sell_price_cents: i64, stock: i64) -> NewProduct {
    NewProduct {
        name: format!("Product {code}"),
        code: code.to_string(),
        description: None,
        buy_price_cents: sell_price_cents / 2,
        sell_price_cents,
        stock,
        low_stock_level: Some(5),
        expiration_date: None,
    }
}

pub(crate) async fn seed_product(
    db: &Database,
    tenant: &TenantId,
    code: &str,
    sell_price_cents: i64,
    stock: i64,
) -> Product {
    let mut store = db.begin(tenant).await.unwrap();
    let product = store
        .products()
        .insert(&new_product(code, sell_price_cents, stock), Utc::now())
        .await
        .unwrap();
    store.commit().await.unwrap();
    product
}

pub(crate) async fn seed_payment_method(db: &Database, tenant: &TenantId, name: &str) -> PaymentMethod {
    let mut store = db.begin(tenant).await.unwrap();
    let method = store.payment_methods().insert(name, Utc::now()).await.unwrap();
    store.commit().await.unwrap();
    method
}

pub(crate) async fn stock_of(db: &Database, tenant: &TenantId, product_id: &str) -> i64 {
    let mut store = db.begin(tenant).await.unwrap();
    store.products().get(product_id).await.unwrap().stock
}

/// A cash sale of `lines` declaring `total_cents`.
pub(crate) fn sale(lines: &[(&str, i64)], total_cents: i64, cash_cents: Option<i64>) -> RecordSaleRequest {
    RecordSaleRequest {
        header: SaleHeader {
            payment_method_id: None,
            cash_received_cents: cash_cents,
            total_price_cents: total_cents,
            email_to: None,
            reference_number: None,
            client_timestamp: None,
        },
        items: lines
            .iter()
            .map(|(product_id, quantity)| LineItemRequest {
                product_id: product_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}
