//! # Seed Data Generator
//!
//! Populates a tenant with payment methods, a small sari-sari store catalog
//! and one demo sale, for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./kahera.db (or KAHERA_DB_PATH) for tenant "demo-store"
//! cargo run -p kahera-ledger --bin seed
//!
//! # Specify database path and tenant
//! cargo run -p kahera-ledger --bin seed -- --db ./data/kahera.db --tenant sari-sari-01
//! ```
//!
//! Re-running against the same tenant fails on the first duplicate product
//! code; point it at a fresh tenant or database instead.

use std::env;
use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use kahera_core::time::format_local;
use kahera_core::{LineItemRequest, Money, NewProduct, RecordSaleRequest, SaleHeader, TenantId};
use kahera_ledger::{init_tracing, Ledger, LedgerConfig};

/// (code, name, buy, sell, stock), prices in centavos
const CATALOG: &[(&str, &str, i64, i64, i64)] = &[
    ("KAPE-250", "Kape Barako 250g", 9_000, 12_500, 40),
    ("ASUKAL-1K", "Asukal Pula 1kg", 6_500, 8_000, 25),
    ("BIGAS-5K", "Bigas Dinorado 5kg", 27_000, 32_000, 12),
    ("SARDINAS-155", "Sardinas 155g", 1_900, 2_600, 120),
    ("NOODLES-55", "Pancit Canton 55g", 1_100, 1_500, 200),
    ("SABON-90", "Sabong Panlaba 90g", 1_400, 1_900, 60),
    ("SUKA-1L", "Sukang Iloko 1L", 3_800, 4_800, 4),
    ("TOYO-1L", "Toyo 1L", 4_200, 5_500, 0),
];

const PAYMENT_METHODS: &[&str] = &["Cash", "GCash", "Maya"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = LedgerConfig::load()?;
    let mut tenant = String::from("demo-store");

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kahera Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: KAHERA_DB_PATH or ./kahera.db)");
                println!("  -t, --tenant <ID>    Tenant to seed (default: demo-store)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let tenant = TenantId::parse(tenant)?;

    println!("🌱 Kahera Seed Data Generator");
    println!("============================");
    println!("Database: {}", config.database_path.display());
    println!("Tenant:   {}", tenant);
    println!();

    let currency = config.currency.clone();
    let ledger = Ledger::open(config).await?;
    let catalog = ledger.catalog();

    println!("Creating payment methods...");
    let mut cash_id = None;
    for name in PAYMENT_METHODS {
        let method = catalog.create_payment_method(&tenant, name).await?;
        if *name == "Cash" {
            cash_id = Some(method.id.clone());
        }
        println!("  ✓ {}", method.name);
    }

    println!("Creating products...");
    let mut products = Vec::with_capacity(CATALOG.len());
    for (code, name, buy, sell, stock) in CATALOG {
        let product = catalog
            .create_product(
                &tenant,
                NewProduct {
                    name: name.to_string(),
                    code: code.to_string(),
                    description: None,
                    buy_price_cents: *buy,
                    sell_price_cents: *sell,
                    stock: *stock,
                    low_stock_level: Some(5),
                    expiration_date: None,
                },
            )
            .await?;
        println!(
            "  ✓ {:<14} {:<22} {} {}",
            product.code,
            product.name,
            currency,
            product.sell_price()
        );
        products.push(product);
    }

    println!("Recording demo sale...");
    let lines: Vec<(usize, i64)> = vec![(0, 2), (3, 5), (4, 10)];
    let total: Money = lines
        .iter()
        .map(|(idx, qty)| products[*idx].sell_price().multiply_quantity(*qty))
        .sum();

    let receipt = ledger
        .sales()
        .record_sale(
            &tenant,
            RecordSaleRequest {
                header: SaleHeader {
                    payment_method_id: cash_id,
                    cash_received_cents: Some(total.cents() + 10_000),
                    total_price_cents: total.cents(),
                    email_to: None,
                    reference_number: None,
                    client_timestamp: None,
                },
                items: lines
                    .iter()
                    .map(|(idx, qty)| LineItemRequest {
                        product_id: products[*idx].id.clone(),
                        quantity: *qty,
                    })
                    .collect(),
            },
        )
        .await?;

    let offset = ledger.config().utc_offset;
    println!(
        "  ✓ {} at {}: {} {} ({} lines, change {})",
        receipt.transaction_id,
        format_local(Utc::now(), offset),
        currency,
        total,
        receipt.item_count,
        Money::from_cents(receipt.change_cents.unwrap_or(0)),
    );

    let overview = ledger.reports().inventory_report(&tenant, Utc::now()).await?;
    println!();
    println!("Inventory: {} products", overview.total_products);
    println!("  In stock:     {}", overview.in_stock);
    println!("  Low stock:    {}", overview.low_stock);
    println!("  Out of stock: {}", overview.out_of_stock);

    info!(tenant = %tenant, "Seed complete");
    ledger.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
