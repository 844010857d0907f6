//! Import and export engine for libris.
//!
//! Reads CSV or tab-delimited files into the catalog, reconciling each row
//! against the authors, titles and borrowers already present, and writes
//! the catalog back out in either dialect.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod fields;
pub mod headers;
pub mod import;
pub mod outcome;
pub mod record;

pub use codec::Dialect;
pub use config::Config;
pub use error::{ExchangeError, Result};
pub use export::Exporter;
pub use headers::HeaderSet;
pub use import::{ImportOptions, Importer};
pub use outcome::{Outcome, Status};
pub use record::Record;
