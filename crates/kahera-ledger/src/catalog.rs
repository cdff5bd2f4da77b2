//! # Catalog
//!
//! Product and payment method management for a tenant.
//!
//! Stock is set once at creation; afterwards only sales, restocks and
//! refund restocks move it. Deleting a product is a soft delete, so line
//! items that reference it stay intact.

use chrono::Utc;
use tracing::info;

use kahera_core::validation::{validate_payment_method_name, validate_uuid};
use kahera_core::{NewProduct, PaymentMethod, Product, ProductUpdate, TenantId};
use kahera_db::Database;

use crate::error::LedgerResult;

#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
}

impl Catalog {
    pub fn new(db: Database) -> Self {
        Catalog { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// ## Errors
    /// - `Validation`: bad code, name, prices or negative opening stock
    /// - `Storage` with code `DUPLICATE`: the code is already in use
    pub async fn create_product(&self, tenant: &TenantId, new: NewProduct) -> LedgerResult<Product> {
        new.validate()?;

        let mut store = self.db.begin(tenant).await?;
        let product = store.products().insert(&new, Utc::now()).await?;
        store.commit().await?;

        info!(tenant = %tenant, product_id = %product.id, code = %product.code, "Product created");
        Ok(product)
    }

    /// Replaces a product's details and prices. Past line items keep the
    /// prices they were sold at.
    pub async fn update_product(
        &self,
        tenant: &TenantId,
        id: &str,
        update: ProductUpdate,
    ) -> LedgerResult<Product> {
        validate_uuid("id", id)?;
        update.validate()?;

        let mut store = self.db.begin(tenant).await?;
        let product = store.products().update_by_id(id, &update, Utc::now()).await?;
        store.commit().await?;

        info!(tenant = %tenant, product_id = %product.id, "Product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, tenant: &TenantId, id: &str) -> LedgerResult<()> {
        validate_uuid("id", id)?;

        let mut store = self.db.begin(tenant).await?;
        store.products().delete_by_id(id, Utc::now()).await?;
        store.commit().await?;

        info!(tenant = %tenant, product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn get_product(&self, tenant: &TenantId, id: &str) -> LedgerResult<Product> {
        let mut store = self.db.begin(tenant).await?;
        let product = store.products().get(id).await?;
        store.commit().await?;
        Ok(product)
    }

    /// Live products, by name.
    pub async fn list_products(&self, tenant: &TenantId) -> LedgerResult<Vec<Product>> {
        let mut store = self.db.begin(tenant).await?;
        let products = store.products().list().await?;
        store.commit().await?;
        Ok(products)
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    pub async fn create_payment_method(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> LedgerResult<PaymentMethod> {
        validate_payment_method_name(name)?;

        let mut store = self.db.begin(tenant).await?;
        let method = store.payment_methods().insert(name, Utc::now()).await?;
        store.commit().await?;

        info!(tenant = %tenant, payment_method_id = %method.id, name = %method.name, "Payment method created");
        Ok(method)
    }

    pub async fn list_payment_methods(&self, tenant: &TenantId) -> LedgerResult<Vec<PaymentMethod>> {
        let mut store = self.db.begin(tenant).await?;
        let methods = store.payment_methods().list().await?;
        store.commit().await?;
        Ok(methods)
    }

    /// ## Errors
    /// `Storage` with code `INVALID_REFERENCE` while sales still use it.
    pub async fn delete_payment_method(&self, tenant: &TenantId, id: &str) -> LedgerResult<()> {
        let mut store = self.db.begin(tenant).await?;
        store.payment_methods().delete_by_id(id).await?;
        store.commit().await?;

        info!(tenant = %tenant, payment_method_id = %id, "Payment method deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
