mod common;

use async_trait::async_trait;
use common::{open_processor, request, seed_catalog};
use rand::Rng;
use shopzo_orders::application::processor::OrderProcessor;
use shopzo_orders::config::EngineConfig;
use shopzo_orders::domain::money::Money;
use shopzo_orders::domain::ports::CatalogStore;
use shopzo_orders::domain::product::{CatalogSnapshot, Decrements, Product, ProductId};
use shopzo_orders::error::{self, OrderError, ValidationError};
use shopzo_orders::infrastructure::data_lock::DataDirLock;
use shopzo_orders::infrastructure::in_memory::{InMemoryCatalogStore, InMemoryOrderLedger};
use shopzo_orders::infrastructure::json_file::{JsonFileCatalogStore, JsonFileOrderLedger};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::Notify;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_for_last_units() {
    let dir = tempdir().unwrap();
    seed_catalog(dir.path());
    let processor = Arc::new(open_processor(dir.path()).await);

    let a = tokio::spawn({
        let processor = processor.clone();
        async move { processor.submit_order(request(&[(1, 2)])).await }
    });
    let b = tokio::spawn({
        let processor = processor.clone();
        async move { processor.submit_order(request(&[(1, 2)])).await }
    });
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(
        failure,
        OrderError::Validation(ValidationError::InsufficientStock { id: 1, .. })
            | OrderError::Conflict(_)
    ));

    assert_eq!(processor.product(1).await.unwrap().stock, 0);
    assert_eq!(processor.orders().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_random_load_never_oversells() {
    let products: Vec<Product> = (1..=5)
        .map(|id| Product {
            id,
            name: format!("Product {id}"),
            description: String::new(),
            price: Money::try_new(rust_decimal::Decimal::new(199 * id, 2)).unwrap(),
            stock: 25,
            image: String::new(),
        })
        .collect();
    let catalog = InMemoryCatalogStore::new(products).unwrap();
    let processor = Arc::new(OrderProcessor::new(
        Box::new(catalog),
        Box::new(InMemoryOrderLedger::new()),
    ));

    let mut rng = rand::thread_rng();
    let mut handles = Vec::new();
    for _ in 0..200 {
        let lines: Vec<(i64, i64)> = (0..rng.gen_range(1..=3))
            .map(|_| (rng.gen_range(1..=5), rng.gen_range(1..=4)))
            .collect();
        let processor = processor.clone();
        handles.push(tokio::spawn(async move {
            processor.submit_order(request(&lines)).await
        }));
    }

    let mut confirmed = HashSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(confirmation) => {
                assert!(confirmed.insert(confirmation.order_id), "duplicate order id");
            }
            Err(OrderError::Validation(ValidationError::InsufficientStock { .. }))
            | Err(OrderError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let orders = processor.orders().await.unwrap();
    assert_eq!(orders.len(), confirmed.len());

    let mut sold: HashMap<i64, u64> = HashMap::new();
    for order in &orders {
        assert!(order.is_consistent());
        for item in &order.items {
            *sold.entry(item.product_id).or_default() += item.quantity;
        }
    }
    for entry in processor.catalog().await.unwrap() {
        let sold = sold.get(&entry.id).copied().unwrap_or(0);
        assert!(sold <= 25, "product {} oversold: {sold}", entry.id);
        assert_eq!(entry.stock, 25 - sold);
    }
}

/// One writer run: lock the directory, load both files, place one order.
async fn locked_order(dir: PathBuf, items: Vec<(i64, i64)>) -> error::Result<()> {
    let config = EngineConfig::resolve(&dir, None, None, false);
    let _lock = DataDirLock::acquire(&config.lock_path).await?;
    let catalog = JsonFileCatalogStore::open(&config.catalog_path).await?;
    let ledger = JsonFileOrderLedger::open(&config.ledger_path).await?;
    OrderProcessor::new(Box::new(catalog), Box::new(ledger))
        .submit_order(request(&items))
        .await
        .map(drop)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_processors_on_same_directory_do_not_oversell() {
    let dir = tempdir().unwrap();
    seed_catalog(dir.path());

    let a = tokio::spawn(locked_order(dir.path().to_path_buf(), vec![(1, 2)]));
    let b = tokio::spawn(locked_order(dir.path().to_path_buf(), vec![(1, 2)]));
    let results = [a.await.unwrap(), b.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(OrderError::Validation(ValidationError::InsufficientStock { id: 1, .. }))
    )));

    let reopened = open_processor(dir.path()).await;
    assert_eq!(reopened.product(1).await.unwrap().stock, 0);
    assert_eq!(reopened.orders().await.unwrap().len(), 1);
}

/// A catalog whose `persist` parks until released.
struct ParkedCatalog {
    inner: InMemoryCatalogStore,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl CatalogStore for ParkedCatalog {
    async fn snapshot(&self) -> error::Result<CatalogSnapshot> {
        self.inner.snapshot().await
    }
    async fn get(&self, id: ProductId) -> error::Result<Option<Product>> {
        self.inner.get(id).await
    }
    async fn apply_decrements(&self, decrements: &Decrements) -> error::Result<()> {
        self.inner.apply_decrements(decrements).await
    }
    async fn restore(&self, decrements: &Decrements) -> error::Result<()> {
        self.inner.restore(decrements).await
    }
    async fn persist(&self) -> error::Result<()> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_catalog_reads_do_not_wait_for_commit() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let catalog = ParkedCatalog {
        inner: InMemoryCatalogStore::new(vec![Product {
            id: 1,
            name: "Mug".into(),
            description: String::new(),
            price: Money::try_new(rust_decimal::Decimal::new(999, 2)).unwrap(),
            stock: 2,
            image: String::new(),
        }])
        .unwrap(),
        entered: entered.clone(),
        release: release.clone(),
    };
    let processor = Arc::new(OrderProcessor::new(
        Box::new(catalog),
        Box::new(InMemoryOrderLedger::new()),
    ));

    let submit = tokio::spawn({
        let processor = processor.clone();
        async move { processor.submit_order(request(&[(1, 1)])).await }
    });
    entered.notified().await;

    let timeout = Duration::from_secs(1);
    let entries = tokio::time::timeout(timeout, processor.catalog())
        .await
        .expect("catalog read blocked by commit")
        .unwrap();
    assert_eq!(entries.len(), 1);
    let product = tokio::time::timeout(timeout, processor.product(1))
        .await
        .expect("product read blocked by commit")
        .unwrap();
    assert_eq!(product.id, 1);
    assert!(!submit.is_finished());

    release.notify_one();
    submit.await.unwrap().unwrap();
    assert_eq!(processor.product(1).await.unwrap().stock, 1);
}
