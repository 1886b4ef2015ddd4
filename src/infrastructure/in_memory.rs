use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{CatalogStore, OrderLedger};
use crate::domain::product::{CatalogSnapshot, Decrements, Product, ProductId, index_products};
use crate::error::{OrderError, PersistenceError, Result, StockError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) type ProductMap = BTreeMap<ProductId, Product>;

/// Checks every decrement first, then subtracts all of them.
pub(crate) fn apply_decrements(
    products: &mut ProductMap,
    decrements: &Decrements,
) -> std::result::Result<(), StockError> {
    for (&id, &quantity) in decrements {
        let product = products.get(&id).ok_or(StockError::NotFound(id))?;
        if product.stock < quantity {
            return Err(StockError::Insufficient {
                id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
    }
    for (id, quantity) in decrements {
        if let Some(product) = products.get_mut(id) {
            product.stock -= quantity;
        }
    }
    Ok(())
}

pub(crate) fn restore_decrements(
    products: &mut ProductMap,
    decrements: &Decrements,
) -> std::result::Result<(), StockError> {
    if let Some(&missing) = decrements.keys().find(|id| !products.contains_key(id)) {
        return Err(StockError::NotFound(missing));
    }
    for (id, quantity) in decrements {
        if let Some(product) = products.get_mut(id) {
            product.stock = product.stock.saturating_add(*quantity);
        }
    }
    Ok(())
}

/// A thread-safe in-memory catalog.
///
/// Uses `Arc<RwLock<BTreeMap<ProductId, Product>>>`: snapshots and lookups share the
/// read lock, stock mutations take the write lock for the whole check-and-subtract.
/// `persist` is a no-op, so state lives only as long as the process.
#[derive(Default, Clone)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<ProductMap>>,
}

impl InMemoryCatalogStore {
    /// Creates a store seeded with `products`.
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let index = index_products(products).map_err(|reason| {
            PersistenceError::InvalidCatalog {
                origin: "memory".to_string(),
                reason,
            }
        })?;
        Ok(Self::from_index(index))
    }

    pub(crate) fn from_index(index: ProductMap) -> Self {
        Self {
            products: Arc::new(RwLock::new(index)),
        }
    }

    pub(crate) fn products(&self) -> &Arc<RwLock<ProductMap>> {
        &self.products
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        let products = self.products.read().await;
        Ok(CatalogSnapshot::new(products.values().cloned()))
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn apply_decrements(&self, decrements: &Decrements) -> Result<()> {
        let mut products = self.products.write().await;
        apply_decrements(&mut products, decrements)?;
        Ok(())
    }

    async fn restore(&self, decrements: &Decrements) -> Result<()> {
        let mut products = self.products.write().await;
        restore_decrements(&mut products, decrements)?;
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}

/// A thread-safe in-memory order ledger.
#[derive(Default, Clone)]
pub struct InMemoryOrderLedger {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderLedger for InMemoryOrderLedger {
    async fn append(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(OrderError::DuplicateOrder(order.id));
        }
        orders.push(order);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.clone())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| &o.id == id).cloned())
    }
}
