mod db;
mod migrations;

pub use db::{CatalogCounts, Database};
pub use migrations::{Migration, MIGRATIONS};
