//! Repository ports the exchange engine is written against.
//!
//! Lookups are exact matches and may return several entities when the
//! catalog holds duplicates; callers decide what an ambiguous result
//! means. Everything here is synchronous. `save_*` inserts or replaces by
//! id and returns the stored entity.

use crate::error::Result;
use crate::model::{Author, AuthorId, Borrower, BorrowerId, Title, TitleId, Volume, VolumeId};

pub trait AuthorRepository {
    /// Authors whose last and first names equal the given strings exactly.
    fn find_authors_by_name(&self, last: &str, first: &str) -> Result<Vec<Author>>;

    fn find_author(&self, id: AuthorId) -> Result<Option<Author>>;

    /// Every author, in insertion order.
    fn all_authors(&self) -> Result<Vec<Author>>;

    fn save_author(&self, author: Author) -> Result<Author>;

    /// Delete an author and drop it from every title's author list.
    fn delete_author(&self, id: AuthorId) -> Result<()>;
}

pub trait TitleRepository {
    /// Titles with this exact text credited to exactly this set of authors.
    ///
    /// Author order is not significant: `[a, b]` matches a title credited
    /// to `[b, a]`, but not one credited to `[a]` or `[a, b, c]`. An empty
    /// slice matches titles with no authors.
    fn find_titles_by_authors(&self, title: &str, authors: &[AuthorId]) -> Result<Vec<Title>>;

    /// Titles with this exact text and form.
    fn find_titles_by_form(&self, title: &str, form: &str) -> Result<Vec<Title>>;

    fn find_title(&self, id: TitleId) -> Result<Option<Title>>;

    /// Every title, in insertion order.
    fn all_titles(&self) -> Result<Vec<Title>>;

    /// Titles crediting the given author.
    fn titles_by_author(&self, author: AuthorId) -> Result<Vec<Title>>;

    /// Titles that list the given title among their contents.
    fn collected_in(&self, content: TitleId) -> Result<Vec<Title>>;

    fn save_title(&self, title: Title) -> Result<Title>;

    /// Delete a title together with the volumes it owns.
    fn delete_title(&self, id: TitleId) -> Result<()>;
}

pub trait VolumeRepository {
    /// Volumes owned by a title, in insertion order.
    fn volumes_for_title(&self, title: TitleId) -> Result<Vec<Volume>>;

    /// Volumes checked out to a borrower, in insertion order.
    fn volumes_for_borrower(&self, borrower: BorrowerId) -> Result<Vec<Volume>>;

    /// Fails when the owning title does not exist, or when an existing
    /// volume would move to another title.
    fn save_volume(&self, volume: Volume) -> Result<Volume>;

    fn delete_volume(&self, id: VolumeId) -> Result<()>;
}

pub trait BorrowerRepository {
    /// Borrowers whose last and first names equal the given strings exactly.
    fn find_borrowers_by_name(&self, last: &str, first: &str) -> Result<Vec<Borrower>>;

    fn find_borrower(&self, id: BorrowerId) -> Result<Option<Borrower>>;

    /// Every borrower, in insertion order.
    fn all_borrowers(&self) -> Result<Vec<Borrower>>;

    fn save_borrower(&self, borrower: Borrower) -> Result<Borrower>;

    /// Delete a borrower; its volumes stay in the catalog, unlinked.
    fn delete_borrower(&self, id: BorrowerId) -> Result<()>;
}

/// All four ports together, as the importer and exporter need them.
pub trait Catalog: AuthorRepository + TitleRepository + VolumeRepository + BorrowerRepository {}

impl<T> Catalog for T where
    T: AuthorRepository + TitleRepository + VolumeRepository + BorrowerRepository + ?Sized
{
}
