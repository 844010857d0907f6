use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;

use libris_exchange::{Config, Exporter, Importer};

use super::open_database;
use super::output::print_outcomes;

pub fn run_import(file: &Path, config: &Config, json: bool) -> Result<ExitCode> {
    let db = open_database(&config.database_path)?;
    let importer = Importer::with_options(&db, config.import.clone());

    match importer.import_file(file) {
        Ok(outcomes) => {
            print_outcomes(&outcomes, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            log::error!("Import of {} failed: {}", file.display(), error);
            print_outcomes(&error.into_outcomes(), json)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn run_export(file: &Path, config: &Config, json: bool) -> Result<ExitCode> {
    let db = open_database(&config.database_path)?;

    match Exporter::new(&db).export_file(file) {
        Ok(outcomes) => {
            print_outcomes(&outcomes, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            log::error!("Export to {} failed: {}", file.display(), error);
            print_outcomes(&error.into_outcomes(), json)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
