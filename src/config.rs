use std::path::{Path, PathBuf};

pub const DEFAULT_CATALOG_FILE: &str = "products.json";
pub const DEFAULT_LEDGER_FILE: &str = "orders.json";
pub const LOCK_EXTENSION: &str = "lock";

/// Where the engine keeps its durable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub catalog_path: PathBuf,
    pub ledger_path: PathBuf,
    /// Lock file serializing writers across processes, next to the catalog.
    pub lock_path: PathBuf,
    /// Load the catalog but never write catalog or ledger back to disk.
    pub in_memory: bool,
}

impl EngineConfig {
    /// Resolves file locations: explicit paths win, otherwise the default file names
    /// inside `data_dir`.
    pub fn resolve(
        data_dir: &Path,
        catalog: Option<PathBuf>,
        ledger: Option<PathBuf>,
        in_memory: bool,
    ) -> Self {
        let catalog_path = catalog.unwrap_or_else(|| data_dir.join(DEFAULT_CATALOG_FILE));
        Self {
            lock_path: catalog_path.with_extension(LOCK_EXTENSION),
            catalog_path,
            ledger_path: ledger.unwrap_or_else(|| data_dir.join(DEFAULT_LEDGER_FILE)),
            in_memory,
        }
    }
}
