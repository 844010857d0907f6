use anyhow::Result;
use libris_exchange::Config;

use super::open_database;

pub fn show_status(config: &Config) -> Result<()> {
    let db = open_database(&config.database_path)?;
    let counts = db.counts()?;

    println!("\n📚 Libris Status\n");
    println!("  Database: {}", config.database_path.display());
    println!("  Authors: {}", counts.authors);
    println!("  Titles: {}", counts.titles);
    println!("  Volumes: {} ({} checked out)", counts.volumes, counts.checked_out);
    println!("  Borrowers: {}", counts.borrowers);

    if counts.titles == 0 {
        println!("\n  Run `libris import <file>` to load a catalog");
    }

    Ok(())
}
