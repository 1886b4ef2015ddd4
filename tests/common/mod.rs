#![allow(dead_code)]

use shopzo_orders::application::processor::OrderProcessor;
use shopzo_orders::domain::order::{Customer, LineRequest, OrderRequest};
use shopzo_orders::infrastructure::json_file::{JsonFileCatalogStore, JsonFileOrderLedger};
use std::path::{Path, PathBuf};

pub const FIXTURE_CATALOG: &str = "tests/fixtures/products.json";

/// Copies the fixture catalog into `dir` and returns its path.
pub fn seed_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("products.json");
    std::fs::copy(FIXTURE_CATALOG, &path).expect("Failed to seed catalog");
    path
}

/// Opens a processor over `products.json` / `orders.json` in `dir`.
pub async fn open_processor(dir: &Path) -> OrderProcessor {
    let catalog = JsonFileCatalogStore::open(dir.join("products.json"))
        .await
        .expect("Failed to open catalog");
    let ledger = JsonFileOrderLedger::open(dir.join("orders.json"))
        .await
        .expect("Failed to open ledger");
    OrderProcessor::new(Box::new(catalog), Box::new(ledger))
}

pub fn customer() -> Customer {
    Customer::new("Ada Lovelace", "ada@example.com", "12 Analytical Row")
}

pub fn request(items: &[(i64, i64)]) -> OrderRequest {
    OrderRequest {
        customer: customer(),
        items: items
            .iter()
            .map(|&(product_id, quantity)| LineRequest::new(product_id, quantity))
            .collect(),
    }
}

pub fn write_cart(dir: &Path, rows: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("cart.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(["product_id", "quantity"]).unwrap();
    for (product_id, quantity) in rows {
        wtr.write_record([product_id, quantity]).unwrap();
    }
    wtr.flush().unwrap();
    path
}
