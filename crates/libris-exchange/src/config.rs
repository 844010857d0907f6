use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::import::ImportOptions;

/// Configuration for libris.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (LIBRIS_* prefix)
/// 3. Config file (~/.config/libris/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite catalog.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: LIBRIS_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/libris/libris.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub import: ImportOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    pub coloured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            coloured: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            logging: LoggingConfig::default(),
            import: ImportOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/libris/config.toml
    /// Reads environment variables with LIBRIS_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("libris");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;
        log::debug!("Loaded configuration: {:?}", config);

        Ok(config)
    }

    /// Load configuration, then override the database path from `--db`.
    pub fn load_with_db_path(db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load()?;
        if let Some(path) = db_path {
            config.database_path = path;
        }
        Ok(config)
    }
}

/// ~/.local/share/libris/libris.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("libris")
        .join("libris.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/libris/config.toml
/// - macOS: ~/Library/Application Support/libris/config.toml
/// - Windows: %APPDATA%\libris\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("libris")
        .join("config.toml")
}

pub fn example_config() -> &'static str {
    r#"# Libris Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (LIBRIS_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite catalog
#
# Can also be set via:
# - CLI: libris --db /custom/path.db import books.csv
# - Environment: LIBRIS_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/libris.db"

[logging]
# error, warn, info, debug or trace
level = "warn"
coloured = true

[import]
# Check imported volumes out to borrowers that already exist in the catalog.
# When false, only borrowers created by the same row are linked.
link_existing_borrower = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
