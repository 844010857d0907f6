use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use libris_exchange::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "libris", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/libris/libris.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print outcomes as JSON instead of one line each
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Import a CSV or tab-delimited file into the catalog
    ///
    /// Files ending in `.csv` are read as RFC 4180 CSV; anything else is
    /// read as tab-delimited text. The first line must name the columns.
    ///
    /// Each row is reconciled in order: authors are matched on their exact
    /// "Last, First" name, titles on their text plus author set, volumes
    /// are always added, and borrowers are matched on their name. Rows that
    /// match more than one existing author, title or borrower are reported
    /// and skipped; the remaining rows still import.
    ///
    /// Exits non-zero when the file cannot be read or its headers are
    /// unusable. In that case nothing is imported.
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Export the whole catalog to a CSV or tab-delimited file
    ///
    /// One row per volume, per title without volumes, per author without
    /// titles and per borrower without volumes. The file is overwritten.
    Export {
        /// File to write
        file: PathBuf,
    },
    /// Show catalog statistics
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load_with_db_path(cli.db)?;
    commands::logging::setup(&config.logging)?;

    match cli.command {
        Commands::Import { file } => commands::run_import(&file, &config, cli.json),
        Commands::Export { file } => commands::run_export(&file, &config, cli.json),
        Commands::Status => {
            commands::show_status(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => commands::config::show_config(&config)?,
                ConfigAction::Path => commands::config::show_path(),
                ConfigAction::Example => commands::config::show_example(),
                ConfigAction::Init => commands::config::init_config()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
