pub mod config;
pub mod exchange;
pub mod logging;
pub mod output;
pub mod status;

pub use exchange::{run_export, run_import};
pub use status::show_status;

use anyhow::{Context, Result};
use libris_core::schema::Database;
use std::path::Path;

/// Open the catalog, creating its directory on first use.
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::open(path).with_context(|| format!("Failed to open database {}", path.display()))
}
