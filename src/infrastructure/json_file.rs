use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{CatalogStore, OrderLedger};
use crate::domain::product::{CatalogSnapshot, Decrements, Product, ProductId, index_products};
use crate::error::{OrderError, PersistenceError, Result};
use crate::infrastructure::in_memory::InMemoryCatalogStore;
use async_trait::async_trait;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, RwLock};

/// Replaces `path` wholesale: write to a temp file in the same directory, fsync, rename,
/// then fsync the directory so the rename itself survives a power loss.
///
/// A reader (or a restarted process) sees either the old content or the new one, never a
/// partial write.
fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(PersistenceError::from)?;
    bytes.push(b'\n');
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
        .await
        .map_err(io::Error::other)??;
    Ok(())
}

/// A catalog backed by a human-readable JSON file.
///
/// The catalog is held in memory (same locking as [`InMemoryCatalogStore`]) and
/// `persist` rewrites the whole file through an atomic replace. `persist_lock` keeps
/// concurrent persists from writing an older state over a newer one.
#[derive(Clone)]
pub struct JsonFileCatalogStore {
    path: PathBuf,
    catalog: InMemoryCatalogStore,
    persist_lock: Arc<Mutex<()>>,
}

impl JsonFileCatalogStore {
    /// Loads the catalog at `path`. The file must exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await?;
        let products: Vec<Product> =
            serde_json::from_slice(&bytes).map_err(PersistenceError::from)?;
        let index = index_products(products).map_err(|reason| PersistenceError::InvalidCatalog {
            origin: path.display().to_string(),
            reason,
        })?;
        tracing::info!(path = %path.display(), products = index.len(), "Catalog loaded");
        Ok(Self {
            path,
            catalog: InMemoryCatalogStore::from_index(index),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Writes `products` as a new catalog file at `path` and opens it.
    pub async fn create(path: impl AsRef<Path>, products: Vec<Product>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let index = index_products(products).map_err(|reason| PersistenceError::InvalidCatalog {
            origin: path.display().to_string(),
            reason,
        })?;
        let products: Vec<&Product> = index.values().collect();
        write_json(&path, &products).await?;
        Self::open(path).await
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        self.catalog.snapshot().await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        self.catalog.get(id).await
    }

    async fn apply_decrements(&self, decrements: &Decrements) -> Result<()> {
        self.catalog.apply_decrements(decrements).await
    }

    async fn restore(&self, decrements: &Decrements) -> Result<()> {
        self.catalog.restore(decrements).await
    }

    async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let products: Vec<Product> = {
            let products = self.catalog.products().read().await;
            products.values().cloned().collect()
        };
        write_json(&self.path, &products).await?;
        tracing::debug!(path = %self.path.display(), "Catalog persisted");
        Ok(())
    }
}

/// An order ledger backed by a JSON array file.
///
/// The full ordered list is kept in memory. Appends are serialized by `append_lock`,
/// which is held across building the next list and replacing the file; the in-memory
/// list only changes once the write succeeded. Reads never wait on file IO.
#[derive(Clone)]
pub struct JsonFileOrderLedger {
    path: PathBuf,
    orders: Arc<RwLock<Vec<Order>>>,
    append_lock: Arc<Mutex<()>>,
}

impl JsonFileOrderLedger {
    /// Loads the ledger at `path`, creating an empty one if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !tokio::fs::try_exists(&path).await? {
            write_json(&path, &Vec::<Order>::new()).await?;
            tracing::info!(path = %path.display(), "Created empty order ledger");
        }
        let bytes = tokio::fs::read(&path).await?;
        let orders: Vec<Order> = serde_json::from_slice(&bytes).map_err(PersistenceError::from)?;
        tracing::info!(path = %path.display(), orders = orders.len(), "Order ledger loaded");
        Ok(Self {
            path,
            orders: Arc::new(RwLock::new(orders)),
            append_lock: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl OrderLedger for JsonFileOrderLedger {
    async fn append(&self, order: Order) -> Result<()> {
        let _guard = self.append_lock.lock().await;
        let mut next = self.orders.read().await.clone();
        if next.iter().any(|o| o.id == order.id) {
            return Err(OrderError::DuplicateOrder(order.id));
        }
        next.push(order);
        write_json(&self.path, &next).await?;
        *self.orders.write().await = next;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| &o.id == id).cloned())
    }
}
