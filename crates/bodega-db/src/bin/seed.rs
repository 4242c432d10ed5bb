//! # Seed Data Generator
//!
//! Populates a database with a demo company for local development.
//!
//! ## Usage
//! ```bash
//! cargo run -p bodega-db --bin seed
//!
//! # Stock units per item (default 50)
//! cargo run -p bodega-db --bin seed -- --stock 200
//!
//! # Specify database path
//! cargo run -p bodega-db --bin seed -- --db ./data/bodega.db
//! ```
//!
//! ## Generated Data
//! - One company with two warehouses (Central, Norte)
//! - Two clients: a walk-in counter client and an invoiced business
//! - The same catalog stocked in both warehouses; SKUs repeat across
//!   warehouses but ids do not, so a sale can only use its own warehouse's ids

use bodega_db::{Database, DbConfig, NewClient, NewStockItem};
use std::env;

/// Hardware store catalog: (sku, title, price in cents)
const CATALOG: &[(&str, &str, i64)] = &[
    ("TOR-0832", "Tornillo volcanita 8x32 (caja 100)", 2490),
    ("TOR-1050", "Tornillo madera 10x50 (caja 100)", 3190),
    ("CLA-0200", "Clavo corriente 2\" (kg)", 1890),
    ("CEM-2500", "Cemento 25 kg", 5990),
    ("YES-2500", "Yeso 25 kg", 4290),
    ("PIN-LTB1", "Pintura látex blanco 1 gal", 14990),
    ("PIN-ESM1", "Esmalte sintético negro 1/4 gal", 6990),
    ("BRO-0003", "Brocha 3\"", 2290),
    ("HUI-0012", "Huincha de medir 5 m", 4590),
    ("GUA-NIT1", "Guantes de nitrilo (par)", 1290),
    ("CIN-AIS1", "Cinta aisladora 20 m", 990),
    ("CAB-2515", "Cable eléctrico 2.5 mm (m)", 690),
];

const WAREHOUSES: &[&str] = &["Central", "Norte"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut stock: i64 = 50;
    let mut db_path = String::from("./data/bodega.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stock" | "-s" => {
                if i + 1 < args.len() {
                    stock = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bodega Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stock <N>    Units per stock item (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/bodega.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Bodega Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!("Units per item: {}", stock);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let directory = db.directory();
    let existing = directory.count_companies().await?;
    if existing > 0 {
        println!("⚠ Database already has {} companies", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let company = directory.create_company("Ferretería Los Andes").await?;
    println!("✓ Company {} ({})", company.name, company.id);

    let counter = directory.create_client(NewClient::named("Cliente mostrador")).await?;
    let business = directory
        .create_client(NewClient {
            tax_id: Some("76.543.210-K".to_string()),
            business_name: Some("Constructora Cordillera SpA".to_string()),
            business_activity: Some("Construcción de edificios".to_string()),
            address: Some("Av. Los Carrera 1450, Concepción".to_string()),
            email: Some("compras@cordillera.cl".to_string()),
            ..NewClient::named("Constructora Cordillera")
        })
        .await?;
    println!("✓ Clients {} / {}", counter.id, business.id);

    for name in WAREHOUSES {
        let warehouse = directory.create_warehouse(&company.id, name).await?;
        println!();
        println!("Warehouse {} ({})", warehouse.name, warehouse.id);

        for (sku, title, price_cents) in CATALOG {
            let item = db
                .stock()
                .create(NewStockItem {
                    warehouse_id: warehouse.id.clone(),
                    sku: sku.to_string(),
                    title: title.to_string(),
                    price_cents: *price_cents,
                    available_quantity: stock,
                })
                .await?;
            println!("  {:<10} {:>4}  {}", item.sku, item.available_quantity, item.id);
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
