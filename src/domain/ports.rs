use super::order::{Order, OrderId};
use super::product::{CatalogSnapshot, Decrements, Product, ProductId};
use crate::error::Result;
use async_trait::async_trait;

/// Owner of product state.
///
/// Implementations must make `apply_decrements` all-or-nothing and linearizable with
/// respect to other mutating calls, and `persist` a whole-record replace.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Point-in-time copy of every product.
    async fn snapshot(&self) -> Result<CatalogSnapshot>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>>;

    /// Subtracts every quantity, or none of them.
    ///
    /// Fails with `OrderError::Stock` naming the first offending product in id order.
    async fn apply_decrements(&self, decrements: &Decrements) -> Result<()>;

    /// Adds previously applied decrements back. Only used to roll back a commit
    /// whose persistence failed.
    async fn restore(&self, decrements: &Decrements) -> Result<()>;

    /// Durably writes the full current catalog.
    async fn persist(&self) -> Result<()>;
}

/// Append-only, durable history of committed orders.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Adds `order` as the last entry. Rejects an id that is already recorded.
    async fn append(&self, order: Order) -> Result<()>;

    async fn list(&self) -> Result<Vec<Order>>;

    async fn get(&self, id: &OrderId) -> Result<Option<Order>>;
}

pub type CatalogStoreBox = Box<dyn CatalogStore>;
pub type OrderLedgerBox = Box<dyn OrderLedger>;
