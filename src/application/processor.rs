use super::committer::InventoryCommitter;
use super::validator::validate;
use crate::domain::order::{Order, OrderConfirmation, OrderId, OrderRequest};
use crate::domain::ports::{CatalogStoreBox, OrderLedgerBox};
use crate::domain::product::{CatalogEntry, Product, ProductId};
use crate::error::{OrderError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::Mutex;

/// Where a submission is in its lifecycle.
///
/// `Received → Validated → StockCommitted → Recorded → Confirmed`, or `Rejected` from
/// any point before `Recorded`. `Inconsistent` is only reachable from `StockCommitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStage {
    Received,
    Validated,
    StockCommitted,
    Recorded,
    Confirmed,
    Rejected,
    Inconsistent,
}

impl fmt::Display for OrderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStage::Received => "received",
            OrderStage::Validated => "validated",
            OrderStage::StockCommitted => "stock_committed",
            OrderStage::Recorded => "recorded",
            OrderStage::Confirmed => "confirmed",
            OrderStage::Rejected => "rejected",
            OrderStage::Inconsistent => "inconsistent",
        };
        f.write_str(name)
    }
}

/// An order whose stock was durably deducted but which never reached the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub order: Order,
    pub error: String,
    pub detected_at: DateTime<Utc>,
}

/// The entry point for reading the catalog and submitting orders.
///
/// Owns the catalog and ledger backends. `commit_lock` is the single serialization
/// point: one submission at a time runs validate → commit → append. Catalog and
/// ledger reads do not take it.
pub struct OrderProcessor {
    catalog: CatalogStoreBox,
    ledger: OrderLedgerBox,
    commit_lock: Mutex<()>,
    anomalies: Mutex<Vec<Anomaly>>,
}

impl OrderProcessor {
    /// Creates a new `OrderProcessor`.
    ///
    /// # Arguments
    ///
    /// * `catalog` - The store owning product state.
    /// * `ledger` - The append-only store of committed orders.
    pub fn new(catalog: CatalogStoreBox, ledger: OrderLedgerBox) -> Self {
        Self {
            catalog,
            ledger,
            commit_lock: Mutex::new(()),
            anomalies: Mutex::new(Vec::new()),
        }
    }

    /// Lists every product for display. May be slightly stale relative to an
    /// in-flight commit.
    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.catalog.snapshot().await?.entries())
    }

    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.catalog
            .get(id)
            .await?
            .ok_or(OrderError::ProductNotFound(id))
    }

    /// Validates, commits stock for, and records one order.
    ///
    /// On any failure before the ledger append, catalog and ledger are unchanged. If the
    /// append fails after stock was committed, the order is flagged as an anomaly and
    /// the call fails with `Inconsistent`.
    #[tracing::instrument(skip_all, fields(lines = request.items.len()))]
    pub async fn submit_order(&self, request: OrderRequest) -> Result<OrderConfirmation> {
        advance(OrderStage::Received);
        let _serial = self.commit_lock.lock().await;

        let snapshot = self.catalog.snapshot().await.inspect_err(reject)?;
        let validated = validate(&snapshot, &request)
            .map_err(OrderError::from)
            .inspect_err(reject)?;
        advance(OrderStage::Validated);

        let order = InventoryCommitter::new(&*self.catalog)
            .commit(validated)
            .await
            .inspect_err(reject)?;
        advance(OrderStage::StockCommitted);

        let confirmation = OrderConfirmation {
            order_id: order.id.clone(),
            total: order.total,
        };

        if let Err(e) = self.ledger.append(order.clone()).await {
            advance(OrderStage::Inconsistent);
            tracing::error!(
                order_id = %order.id,
                total = %order.total,
                error = %e,
                "Stock deducted but order not recorded, operator reconciliation required"
            );
            self.anomalies.lock().await.push(Anomaly {
                order,
                error: e.to_string(),
                detected_at: Utc::now(),
            });
            return Err(OrderError::Inconsistent {
                order_id: confirmation.order_id,
                source: Box::new(e),
            });
        }
        advance(OrderStage::Recorded);

        advance(OrderStage::Confirmed);
        tracing::info!(
            order_id = %confirmation.order_id,
            total = %confirmation.total,
            "Order placed"
        );
        Ok(confirmation)
    }

    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.ledger.list().await
    }

    pub async fn order(&self, id: &OrderId) -> Result<Option<Order>> {
        self.ledger.get(id).await
    }

    /// Orders flagged `Inconsistent` since this processor was created.
    pub async fn anomalies(&self) -> Vec<Anomaly> {
        self.anomalies.lock().await.clone()
    }
}

fn advance(stage: OrderStage) {
    tracing::debug!(%stage, "Order stage");
}

fn reject(error: &OrderError) {
    advance(OrderStage::Rejected);
    tracing::warn!(error = %error, retryable = error.is_retryable(), "Order rejected");
}
