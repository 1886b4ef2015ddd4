use super::validator::ValidatedOrder;
use crate::domain::order::{Order, OrderId};
use crate::domain::ports::CatalogStore;
use crate::error::{OrderError, Result};
use chrono::Utc;

/// Applies a validated order's stock decrements to the catalog as one unit and makes
/// them durable.
pub struct InventoryCommitter<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> InventoryCommitter<'a> {
    pub fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }

    /// Commits stock for `validated` and returns the order draft to record.
    ///
    /// Decrements are re-derived from the priced items and checked against the current
    /// catalog, not the validation snapshot. A product that no longer has enough stock
    /// fails the whole order with `Conflict`. If the catalog cannot be persisted, the
    /// decrements are put back and the order fails with `Persistence`.
    pub async fn commit(&self, validated: ValidatedOrder) -> Result<Order> {
        let decrements = validated.decrements();

        self.catalog
            .apply_decrements(&decrements)
            .await
            .map_err(|e| match e {
                OrderError::Stock(stock) => OrderError::Conflict(stock),
                other => other,
            })?;

        if let Err(e) = self.catalog.persist().await {
            tracing::warn!(error = %e, "Catalog persist failed, rolling back stock");
            if let Err(rollback) = self.catalog.restore(&decrements).await {
                tracing::error!(
                    error = %rollback,
                    ?decrements,
                    "Stock rollback failed, in-memory catalog differs from disk"
                );
            }
            return Err(e);
        }

        Ok(Order {
            id: OrderId::generate(),
            created_at: Utc::now(),
            customer: validated.customer,
            items: validated.items,
            total: validated.total,
        })
    }
}
