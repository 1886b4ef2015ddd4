use crate::domain::order::OrderId;
use crate::domain::product::ProductId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrderError>;

/// Client-caused rejection of an order request. Never mutates state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing customer {0}")]
    MissingCustomerField(&'static str),
    #[error("no items in order")]
    EmptyOrder,
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),
    #[error("insufficient stock for {name} (product {id}): requested {requested}, available {available}")]
    InsufficientStock {
        id: ProductId,
        name: String,
        requested: u64,
        available: u64,
    },
    #[error("order amount out of range")]
    AmountOutOfRange,
}

/// Failure of a catalog stock mutation. The store is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("insufficient stock for {name} (product {id}): requested {requested}, available {available}")]
    Insufficient {
        id: ProductId,
        name: String,
        requested: u64,
        available: u64,
    },
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid catalog in {origin}: {reason}")]
    InvalidCatalog { origin: String, reason: String },
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Stock changed between validation and commit. Safe to retry from a fresh snapshot.
    #[error("conflict: {0}")]
    Conflict(#[source] StockError),
    #[error("catalog error: {0}")]
    Stock(#[from] StockError),
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("order {0} already recorded")]
    DuplicateOrder(OrderId),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    /// Stock was durably decremented but the ledger entry is missing.
    #[error("order {order_id} deducted stock but could not be recorded: {source}")]
    Inconsistent {
        order_id: OrderId,
        #[source]
        source: Box<OrderError>,
    },
}

impl OrderError {
    /// HTTP-equivalent status for the thin request layer that sits on top of the engine.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::Validation(_)
            | OrderError::Conflict(_)
            | OrderError::Stock(_)
            | OrderError::Csv(_) => 400,
            OrderError::ProductNotFound(_) => 404,
            OrderError::DuplicateOrder(_)
            | OrderError::Persistence(_)
            | OrderError::Inconsistent { .. } => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Conflict(_))
    }
}

impl From<std::io::Error> for OrderError {
    fn from(e: std::io::Error) -> Self {
        OrderError::Persistence(PersistenceError::Io(e))
    }
}

impl From<serde_json::Error> for OrderError {
    fn from(e: serde_json::Error) -> Self {
        OrderError::Persistence(PersistenceError::Serialization(e))
    }
}

