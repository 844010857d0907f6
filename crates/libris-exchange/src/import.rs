//! Row-by-row reconciliation of flat records into the catalog.
//!
//! Each record runs through four steps, Author, Title, Volume and
//! Borrower. A step returns `ControlFlow::Break` when nothing further can
//! be done for the row, whether because the row is ambiguous or because it
//! carries no data for the next entity.

use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::path::Path;

use libris_core::model::{Author, AuthorId, Borrower, Title, Volume};
use libris_core::Catalog;

use crate::codec;
use crate::error::Result;
use crate::headers::HeaderSet;
use crate::outcome::Outcome;
use crate::record::Record;

type Step<T> = Result<ControlFlow<(), T>>;

/// Knobs for ambiguous corners of the import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Check a new volume out to a borrower that already exists.
    ///
    /// Off by default: only borrowers created by the same row get the
    /// volume linked.
    pub link_existing_borrower: bool,
}

#[derive(Debug)]
pub struct Importer<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    options: ImportOptions,
}

impl<'a, C: Catalog + ?Sized> Importer<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self::with_options(catalog, ImportOptions::default())
    }

    pub const fn with_options(catalog: &'a C, options: ImportOptions) -> Self {
        Self { catalog, options }
    }

    /// Import every row of a CSV or tab-delimited file.
    ///
    /// Fails before touching the catalog when the file cannot be read, its
    /// quoting is malformed, or its headers are unusable. Per-row problems
    /// are reported as error outcomes instead.
    pub fn import_file(&self, path: &Path) -> Result<Vec<Outcome>> {
        log::info!("Importing {}", path.display());
        let table = codec::read_file(path)?;
        let headers = HeaderSet::parse(table.headers.iter().map(String::as_str))?;

        let records = table
            .rows
            .iter()
            .map(|row| Record::from_lookup(|field| row.get(field).map(String::as_str)));
        let outcomes = self.import_records(&headers, records)?;

        log::info!(
            "Imported {} rows from {}: {} outcomes",
            table.rows.len(),
            path.display(),
            outcomes.len()
        );
        Ok(outcomes)
    }

    /// Import already-parsed records. Unknown-header warnings come first in
    /// the result.
    pub fn import_records<I>(&self, headers: &HeaderSet, records: I) -> Result<Vec<Outcome>>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut outcomes: Vec<Outcome> = headers.warnings().iter().map(Outcome::error).collect();
        for (index, record) in records.into_iter().enumerate() {
            log::debug!("Importing row {}: {:?}", index + 1, record.title);
            self.import_record(headers, &record, &mut outcomes)?;
        }
        Ok(outcomes)
    }

    fn import_record(
        &self,
        headers: &HeaderSet,
        record: &Record,
        outcomes: &mut Vec<Outcome>,
    ) -> Result<()> {
        let ControlFlow::Continue(authors) = self.resolve_authors(headers, record, outcomes)? else {
            return Ok(());
        };
        let ControlFlow::Continue(title) = self.resolve_title(headers, record, &authors, outcomes)?
        else {
            return Ok(());
        };
        let ControlFlow::Continue(volume) = self.add_volume(headers, record, &title, outcomes)? else {
            return Ok(());
        };
        self.resolve_borrower(headers, record, volume, outcomes)
    }

    /// Every listed name is looked up before giving up, so each ambiguous
    /// name gets its own outcome.
    fn resolve_authors(
        &self,
        headers: &HeaderSet,
        record: &Record,
        outcomes: &mut Vec<Outcome>,
    ) -> Step<Vec<AuthorId>> {
        if !headers.can_import_authors() || record.author_name.is_empty() {
            return Ok(ControlFlow::Continue(Vec::new()));
        }

        let mut ids = Vec::new();
        let mut ambiguous = false;
        for (raw, name) in record.author_names() {
            let mut matches = self.catalog.find_authors_by_name(&name.last, &name.first)?;
            match matches.len() {
                0 => {
                    let author = Author::new(name)
                        .with_nationality(&record.nationality)
                        .with_birth_place(&record.birth_place)
                        .with_birth_date(record.birth_date)
                        .with_death_date(record.death_date)
                        .with_note(&record.author_note);
                    let author = self.catalog.save_author(author)?;
                    outcomes.push(Outcome::success(format!("Added author {}", author.name())));
                    ids.push(author.id);
                }
                1 => {
                    let author = matches.remove(0);
                    ids.push(author.id);
                }
                _ => {
                    outcomes.push(Outcome::error(format!(
                        "Found multiple Author matches for \"{raw}\""
                    )));
                    ambiguous = true;
                }
            }
        }

        if ambiguous {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(ids))
        }
    }

    fn resolve_title(
        &self,
        headers: &HeaderSet,
        record: &Record,
        authors: &[AuthorId],
        outcomes: &mut Vec<Outcome>,
    ) -> Step<Title> {
        if !headers.can_import_titles() || record.title.is_empty() {
            return Ok(ControlFlow::Break(()));
        }

        let mut matches = self.catalog.find_titles_by_authors(&record.title, authors)?;
        match matches.len() {
            0 => {
                let mut title = Title::new(&record.title)
                    .with_category(&record.category)
                    .with_form(&record.form)
                    .with_publication_year(record.year())
                    .with_have_read(record.have_read)
                    .with_note(&record.title_note)
                    .with_authors(authors.iter().copied());
                self.resolve_contents(record, &mut title, outcomes)?;

                let title = self.catalog.save_title(title)?;
                outcomes.push(Outcome::success(format!("Added title {}", title.title)));
                Ok(ControlFlow::Continue(title))
            }
            1 => Ok(ControlFlow::Continue(matches.remove(0))),
            _ => {
                outcomes.push(Outcome::error(format!(
                    "Found multiple title matches for \"{}\"",
                    record.title
                )));
                Ok(ControlFlow::Break(()))
            }
        }
    }

    /// Unresolved contents are reported and skipped; they never abandon the
    /// row.
    fn resolve_contents(
        &self,
        record: &Record,
        title: &mut Title,
        outcomes: &mut Vec<Outcome>,
    ) -> Result<()> {
        for content in &record.contents {
            let matches = self
                .catalog
                .find_titles_by_form(&content.title, &content.form)?;
            match matches.as_slice() {
                [] => outcomes.push(Outcome::error(format!(
                    "No match for contents {} [{}] in title {}",
                    content.title, content.form, record.title
                ))),
                [found] => title.add_content(found.id),
                _ => outcomes.push(Outcome::error(format!(
                    "Multiple matches for contents {} [{}] in title {}",
                    content.title, content.form, record.title
                ))),
            }
        }
        Ok(())
    }

    /// Volumes are never deduplicated.
    fn add_volume(
        &self,
        headers: &HeaderSet,
        record: &Record,
        title: &Title,
        outcomes: &mut Vec<Outcome>,
    ) -> Step<Volume> {
        if !headers.can_import_volumes() {
            return Ok(ControlFlow::Break(()));
        }

        let mut volume = Volume::new(title.id);
        volume.binding.clone_from(&record.binding);
        volume.publisher.clone_from(&record.publisher);
        volume.publication_date.clone_from(&record.publication_date);
        volume.isbn.clone_from(&record.isbn);
        volume.library_of_congress.clone_from(&record.library_of_congress);
        volume.asin.clone_from(&record.asin);
        volume.note.clone_from(&record.volume_note);

        let volume = self.catalog.save_volume(volume)?;
        outcomes.push(Outcome::success(format!(
            "Added volume for {} [{}]",
            title.title,
            volume.details()
        )));
        Ok(ControlFlow::Continue(volume))
    }

    fn resolve_borrower(
        &self,
        headers: &HeaderSet,
        record: &Record,
        mut volume: Volume,
        outcomes: &mut Vec<Outcome>,
    ) -> Result<()> {
        if !headers.can_import_borrowers() || record.borrower_name.is_empty() {
            return Ok(());
        }

        let name = record.borrower();
        let mut matches = self.catalog.find_borrowers_by_name(&name.last, &name.first)?;
        match matches.len() {
            0 => {
                let borrower = Borrower::new(name)
                    .with_check_out_date(&record.check_out_date)
                    .with_note(&record.borrower_note);
                let borrower = self.catalog.save_borrower(borrower)?;
                volume.borrower_id = Some(borrower.id);
                self.catalog.save_volume(volume)?;
                outcomes.push(Outcome::success(format!(
                    "Added borrower {}",
                    borrower.name()
                )));
            }
            1 => {
                let borrower = matches.remove(0);
                if self.options.link_existing_borrower {
                    volume.borrower_id = Some(borrower.id);
                    self.catalog.save_volume(volume)?;
                } else {
                    log::warn!(
                        "Volume for \"{}\" not checked out to existing borrower {}",
                        record.title,
                        borrower.name()
                    );
                }
            }
            _ => outcomes.push(Outcome::error(format!(
                "Found multiple Borrower matches for \"{}\"",
                record.borrower_name
            ))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Status;
    use libris_core::model::PersonName;
    use libris_core::schema::Database;
    use libris_core::{AuthorRepository, BorrowerRepository, TitleRepository, VolumeRepository};
    use std::collections::HashMap;

    fn rows(header: &[&str], rows: &[&[&str]]) -> (HeaderSet, Vec<Record>) {
        let headers = HeaderSet::parse(header.iter().copied()).unwrap();
        let records = rows
            .iter()
            .map(|cells| {
                let map: HashMap<&str, &str> = header.iter().copied().zip(cells.iter().copied()).collect();
                Record::from_lookup(|field| map.get(field).copied())
            })
            .collect();
        (headers, records)
    }

    fn messages(outcomes: &[Outcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.message.as_str()).collect()
    }

    #[test]
    fn test_author_is_created_once() {
        let db = Database::open_in_memory().unwrap();
        let (headers, records) = rows(
            &["authorName", "title"],
            &[&["Doe, Jane", "First Book"], &["Doe, Jane", "Second Book"]],
        );

        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(db.all_authors().unwrap().len(), 1);
        assert_eq!(db.all_titles().unwrap().len(), 2);
        assert_eq!(
            messages(&outcomes),
            vec!["Added author Doe, Jane", "Added title First Book", "Added title Second Book"]
        );
    }

    #[test]
    fn test_ambiguous_author_abandons_only_that_row() {
        let db = Database::open_in_memory().unwrap();
        db.save_author(Author::new(PersonName::new("Smith", "Pat"))).unwrap();
        db.save_author(Author::new(PersonName::new("Smith", "Pat"))).unwrap();

        let (headers, records) = rows(
            &["authorName", "title", "binding", "borrowerName"],
            &[
                &["Smith, Pat", "Lost Book", "Hard", "Doe, Jo"],
                &["Doe, Jane", "Kept Book", "Soft", ""],
            ],
        );
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(outcomes[0].status, Status::Error);
        assert_eq!(outcomes[0].message, "Found multiple Author matches for \"Smith, Pat\"");
        let titles = db.all_titles().unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].title, "Kept Book");
        assert!(db.all_borrowers().unwrap().is_empty());
        assert_eq!(db.volumes_for_title(titles[0].id).unwrap().len(), 1);
    }

    #[test]
    fn test_every_ambiguous_author_is_reported() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..2 {
            db.save_author(Author::new(PersonName::new("Smith", "Pat"))).unwrap();
            db.save_author(Author::new(PersonName::new("Jones", "Sam"))).unwrap();
        }

        let (headers, records) = rows(&["authorName", "title"], &[&["Smith, Pat; Jones, Sam", "Duet"]]);
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.status == Status::Error));
        assert!(db.all_titles().unwrap().is_empty());
    }

    #[test]
    fn test_contents_resolution() {
        let db = Database::open_in_memory().unwrap();
        let moby = db
            .save_title(Title::new("Moby Dick").with_form("Novel"))
            .unwrap();

        let (headers, records) = rows(
            &["title", "contents"],
            &[&["Collected Works", "Moby Dick::Novel//Unknown Tale::Short"]],
        );
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(
            messages(&outcomes),
            vec![
                "No match for contents Unknown Tale [Short] in title Collected Works",
                "Added title Collected Works",
            ]
        );
        let collection = db.collected_in(moby.id).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0].content_ids, vec![moby.id]);
    }

    #[test]
    fn test_ambiguous_contents_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        db.save_title(Title::new("Bartleby").with_form("Short")).unwrap();
        db.save_title(Title::new("Bartleby").with_form("Short")).unwrap();

        let (headers, records) = rows(&["title", "contents"], &[&["Piazza Tales", "Bartleby::Short"]]);
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(
            outcomes[0].message,
            "Multiple matches for contents Bartleby [Short] in title Piazza Tales"
        );
        assert!(outcomes[1].is_success());
    }

    #[test]
    fn test_title_fields_are_saved() {
        let db = Database::open_in_memory().unwrap();
        let (headers, records) = rows(
            &["title", "category", "form", "publicationYear", "haveRead", "titleNote"],
            &[&["Moby Dick", "Fiction", "Novel", "1851", "yes", "whale"]],
        );
        Importer::new(&db).import_records(&headers, records).unwrap();

        let title = db.all_titles().unwrap().remove(0);
        assert_eq!(title.category, "Fiction");
        assert_eq!(title.form, "Novel");
        assert_eq!(title.publication_year, 1851);
        assert!(title.have_read);
        assert_eq!(title.note, "whale");
    }

    #[test]
    fn test_volume_and_new_borrower() {
        let db = Database::open_in_memory().unwrap();
        let (headers, records) = rows(
            &["title", "binding", "publisher", "publicationDate", "borrowerName", "checkOutDate"],
            &[&["Moby Dick", "Hard", "Harper", "1851", "Doe, Jo", "2024-01-05"]],
        );
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(
            messages(&outcomes),
            vec![
                "Added title Moby Dick",
                "Added volume for Moby Dick [Hard Harper 1851]",
                "Added borrower Doe, Jo",
            ]
        );
        let borrower = db.all_borrowers().unwrap().remove(0);
        assert_eq!(borrower.check_out_date, "2024-01-05");
        assert_eq!(db.volumes_for_borrower(borrower.id).unwrap().len(), 1);
    }

    #[test]
    fn test_existing_borrower_link_is_optional() {
        let db = Database::open_in_memory().unwrap();
        let borrower = db
            .save_borrower(Borrower::new(PersonName::new("Doe", "Jo")))
            .unwrap();
        let (headers, records) = rows(&["title", "isbn", "borrowerName"], &[&["Moby Dick", "123", "Doe, Jo"]]);

        let outcomes = Importer::new(&db)
            .import_records(&headers, records.clone())
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(db.volumes_for_borrower(borrower.id).unwrap().is_empty());

        let options = ImportOptions {
            link_existing_borrower: true,
        };
        Importer::with_options(&db, options)
            .import_records(&headers, records)
            .unwrap();
        assert_eq!(db.volumes_for_borrower(borrower.id).unwrap().len(), 1);
        assert_eq!(db.all_borrowers().unwrap().len(), 1);
    }

    #[test]
    fn test_ambiguous_borrower() {
        let db = Database::open_in_memory().unwrap();
        db.save_borrower(Borrower::new(PersonName::new("Doe", "Jo"))).unwrap();
        db.save_borrower(Borrower::new(PersonName::new("Doe", "Jo"))).unwrap();

        let (headers, records) = rows(&["title", "isbn", "borrowerName"], &[&["Moby Dick", "1", "Doe, Jo"]]);
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(outcomes[2].message, "Found multiple Borrower matches for \"Doe, Jo\"");
        let title = db.all_titles().unwrap().remove(0);
        let volumes = db.volumes_for_title(title.id).unwrap();
        assert_eq!(volumes.len(), 1);
        assert!(!volumes[0].is_checked_out());
    }

    #[test]
    fn test_unknown_header_warning_leads_outcomes() {
        let db = Database::open_in_memory().unwrap();
        let (headers, records) = rows(&["title", "shelf"], &[&["Moby Dick", "A3"]]);
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(outcomes[0].status, Status::Error);
        assert_eq!(outcomes[0].message, "Unknown field \"shelf\" will be ignored");
        assert_eq!(outcomes[1].message, "Added title Moby Dick");
    }

    #[test]
    fn test_blank_title_skips_rest_of_row() {
        let db = Database::open_in_memory().unwrap();
        let (headers, records) = rows(&["authorName", "title", "binding"], &[&["Doe, Jane", "", "Hard"]]);
        let outcomes = Importer::new(&db).import_records(&headers, records).unwrap();

        assert_eq!(messages(&outcomes), vec!["Added author Doe, Jane"]);
        assert!(db.all_titles().unwrap().is_empty());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ImportOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.link_existing_borrower);
    }
}
