//! Shared utilities
//!
//! - `load_config` - Resolve configuration, applying CLI overrides last
//! - `open_db` - Open the store

use std::path::Path;

use anyhow::{Context, Result};
use payinsight_core::{db::Database, Config};
use tracing::debug;

/// Resolve defaults, config file and environment, then apply `--db`
pub fn load_config(config_path: Option<&Path>, db_override: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if let Some(db) = db_override {
        config.store.path = db.to_path_buf();
    }
    debug!(
        store = %config.store.path.display(),
        csv = %config.import.csv_path.display(),
        "Configuration resolved"
    );
    Ok(config)
}

/// Open (or create) the store
pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}
