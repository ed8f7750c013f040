//! # Seed Data Generator
//!
//! Populates a development database with stores, products, settings and tax
//! rates.
//!
//! ## Usage
//! ```bash
//! # Default database path
//! cargo run -p pos-db --bin seed
//!
//! # Specify database path
//! cargo run -p pos-db --bin seed -- --db ./data/pos.db
//! ```
//!
//! Each store gets the same catalogue with its own stock levels, so store
//! scoping is visible when testing from the till.

use std::env;

use pos_core::{Money, TaxRate};
use pos_db::{Database, DbConfig, NewProduct};

const STORES: &[&str] = &["Mall Supermarket - Ground Floor", "Mall Supermarket - Annex"];

/// (name, price in cents, barcode)
const CATALOGUE: &[(&str, i64, &str)] = &[
    ("Milk 1L", 1000, "6001000000011"),
    ("Bread Loaf", 550, "6001000000028"),
    ("Eggs (Crate of 30)", 4500, "6001000000035"),
    ("Rice 5kg", 8999, "6001000000042"),
    ("Sugar 1kg", 1200, "6001000000059"),
    ("Cooking Oil 1L", 2350, "6001000000066"),
    ("Tomato Paste 400g", 899, "6001000000073"),
    ("Sardines 125g", 650, "6001000000080"),
    ("Bottled Water 1.5L", 400, "6001000000097"),
    ("Laundry Soap", 250, "6001000000103"),
    ("Toothpaste 100ml", 1599, "6001000000110"),
    ("Instant Noodles", 300, "6001000000127"),
];

const TAX_RATES: &[(&str, u32)] = &[("VAT", 1250), ("NHIL", 250)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mall POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mall POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, bps) in TAX_RATES {
        db.settings().add_tax_rate(name, TaxRate::from_bps(*bps)).await?;
    }
    println!("✓ Tax rates: {}", TAX_RATES.len());

    let mut generated = 0;
    for (store_idx, store_name) in STORES.iter().enumerate() {
        let store_id = db.stores().insert(store_name).await?;

        for (product_idx, (name, price, barcode)) in CATALOGUE.iter().enumerate() {
            // Spread stock so every status flag shows up
            let stock = ((product_idx * 7 + store_idx * 3) % 40) as i64;

            let product = NewProduct {
                store_id,
                name: name.to_string(),
                price: Money::from_cents(*price),
                stock,
                barcode: Some(barcode.to_string()),
            };

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            generated += 1;
        }

        println!("✓ Store #{} {}", store_id, store_name);
    }

    println!();
    println!("✓ Generated {} products", generated);

    db.close().await;
    Ok(())
}
