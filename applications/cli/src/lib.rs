//! Budget Tracker CLI
//!
//! Command-line front end over `budget-store`. State lives in a data
//! directory (one JSON file per persisted slice), so the signed-in session
//! carries over between invocations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

use anyhow::{Context, Result};
use budget_store::{BudgetStore, FileStorage};
use std::path::PathBuf;
use std::sync::Arc;

pub use cli::{Cli, Command};
pub use commands::execute;
pub use config::CliConfig;
pub use output::{render_failure, Rendered};

/// Open the file-backed store described by `config`
pub fn open_store(config: &CliConfig, data_dir_override: Option<PathBuf>) -> Result<BudgetStore> {
    let data_dir = data_dir_override.unwrap_or_else(|| config.storage.data_dir.clone());
    let storage = FileStorage::new(&data_dir);
    storage
        .initialize()
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let store = BudgetStore::open(
        Arc::new(storage),
        config.hasher_kind().build(),
        config.store_options(),
    )?;
    tracing::debug!(data_dir = %data_dir.display(), "store ready");
    Ok(store)
}
