use super::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable product identifier. Signed so that malformed requests (zero or negative
/// ids) can be represented and rejected by validation.
pub type ProductId = i64;

/// A catalog product.
///
/// `name`, `description` and `image` are display metadata and opaque to the engine.
/// `stock` is only ever mutated by a catalog store while applying decrements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub stock: u64,
    #[serde(default)]
    pub image: String,
}

/// Listing projection of a product, as returned by the catalog read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: u64,
    pub image: String,
}

impl From<&Product> for CatalogEntry {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            price: p.price,
            stock: p.stock,
            image: p.image.clone(),
        }
    }
}

/// Indexes a loaded product list by id, rejecting duplicate ids and negative prices.
pub fn index_products(
    products: Vec<Product>,
) -> std::result::Result<BTreeMap<ProductId, Product>, String> {
    let mut index = BTreeMap::new();
    for product in products {
        if Money::try_new(product.price.value()).is_none() {
            return Err(format!("product {} has a negative price", product.id));
        }
        let id = product.id;
        if index.insert(id, product).is_some() {
            return Err(format!("duplicate product id {id}"));
        }
    }
    Ok(index)
}

/// Quantities to subtract from stock, keyed by product in ascending id order.
pub type Decrements = BTreeMap<ProductId, u64>;

/// An owned point-in-time copy of the catalog.
///
/// Only a hint for validation: stock may have changed by the time an order commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    products: BTreeMap<ProductId, Product>,
}

impl CatalogSnapshot {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.products.values().map(CatalogEntry::from).collect()
    }
}
