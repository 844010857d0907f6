//! Core domain model for libris.
//!
//! This crate defines the catalog entities (Author, Title, Volume,
//! Borrower), the repository ports the exchange engine is written
//! against, and a SQLite-backed `Database` that implements them.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod repository;
pub mod schema;

pub use error::{Error, Result};
pub use repository::{AuthorRepository, BorrowerRepository, Catalog, TitleRepository, VolumeRepository};
