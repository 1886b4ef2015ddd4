use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use shopzo_orders::application::processor::OrderProcessor;
use shopzo_orders::config::EngineConfig;
use shopzo_orders::domain::order::{Customer, OrderId, OrderRequest};
use shopzo_orders::domain::ports::{CatalogStore, CatalogStoreBox, OrderLedgerBox};
use shopzo_orders::domain::product::ProductId;
use shopzo_orders::infrastructure::data_lock::DataDirLock;
use shopzo_orders::infrastructure::in_memory::{InMemoryCatalogStore, InMemoryOrderLedger};
use shopzo_orders::infrastructure::json_file::{JsonFileCatalogStore, JsonFileOrderLedger};
use shopzo_orders::interfaces::csv::cart_reader::CartReader;
use shopzo_orders::interfaces::csv::catalog_writer::CatalogWriter;
use shopzo_orders::telemetry;
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding products.json and orders.json
    #[arg(long, env = "SHOPZO_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Catalog file (overrides <data-dir>/products.json)
    #[arg(long, env = "SHOPZO_CATALOG")]
    catalog: Option<PathBuf>,

    /// Order ledger file (overrides <data-dir>/orders.json)
    #[arg(long, env = "SHOPZO_LEDGER")]
    ledger: Option<PathBuf>,

    /// Load the catalog but keep every change in memory
    #[arg(long, global = true)]
    in_memory: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog as CSV
    Catalog,
    /// Show one product as JSON
    Product {
        #[arg(allow_negative_numbers = true)]
        id: ProductId,
    },
    /// Place an order for the cart in a CSV file (product_id,quantity)
    Order {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        items: PathBuf,
    },
    /// Show recorded orders as JSON
    Orders {
        /// Only show this order
        #[arg(long)]
        id: Option<String>,
    },
}

async fn open_processor(config: &EngineConfig) -> shopzo_orders::error::Result<OrderProcessor> {
    let catalog = JsonFileCatalogStore::open(&config.catalog_path).await?;

    let (catalog, ledger): (CatalogStoreBox, OrderLedgerBox) = if config.in_memory {
        let products = catalog.snapshot().await?.products().cloned().collect();
        (
            Box::new(InMemoryCatalogStore::new(products)?),
            Box::new(InMemoryOrderLedger::new()),
        )
    } else {
        let ledger = JsonFileOrderLedger::open(&config.ledger_path).await?;
        (Box::new(catalog), Box::new(ledger))
    };

    Ok(OrderProcessor::new(catalog, ledger))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    let config = EngineConfig::resolve(&cli.data_dir, cli.catalog, cli.ledger, cli.in_memory);

    // Held from load to the last write, so overlapping `order` runs see each other's stock.
    let _lock = match cli.command {
        Command::Order { .. } if !config.in_memory => Some(
            DataDirLock::acquire(&config.lock_path)
                .await
                .into_diagnostic()?,
        ),
        _ => None,
    };
    let processor = open_processor(&config).await.into_diagnostic()?;

    let stdout = io::stdout();
    match cli.command {
        Command::Catalog => {
            let entries = processor.catalog().await.into_diagnostic()?;
            CatalogWriter::new(stdout.lock())
                .write_entries(entries)
                .into_diagnostic()?;
        }
        Command::Product { id } => {
            let product = processor.product(id).await.into_diagnostic()?;
            serde_json::to_writer_pretty(stdout.lock(), &product).into_diagnostic()?;
            println!();
        }
        Command::Order {
            name,
            email,
            address,
            items,
        } => {
            let file = File::open(items).into_diagnostic()?;
            let items = CartReader::new(file).read_all().into_diagnostic()?;
            let request = OrderRequest {
                customer: Customer::new(name, email, address),
                items,
            };
            let confirmation = processor.submit_order(request).await.into_diagnostic()?;
            serde_json::to_writer(stdout.lock(), &confirmation).into_diagnostic()?;
            println!();
        }
        Command::Orders { id: Some(id) } => {
            let id = OrderId::from(id);
            let order = processor
                .order(&id)
                .await
                .into_diagnostic()?
                .ok_or_else(|| miette!("order {} not found", id))?;
            serde_json::to_writer_pretty(stdout.lock(), &order).into_diagnostic()?;
            println!();
        }
        Command::Orders { id: None } => {
            let orders = processor.orders().await.into_diagnostic()?;
            serde_json::to_writer_pretty(stdout.lock(), &orders).into_diagnostic()?;
            println!();
        }
    }

    Ok(())
}
