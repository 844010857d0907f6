//! Flattening the catalog back into rows.

use std::fs::File;
use std::path::Path;

use libris_core::model::{Author, Borrower, Title, Volume};
use libris_core::Catalog;

use crate::codec::Dialect;
use crate::error::Result;
use crate::outcome::Outcome;
use crate::record::{ContentRef, Record};

#[derive(Debug)]
pub struct Exporter<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> Exporter<'a, C> {
    pub const fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Write the whole catalog to `path`, dialect chosen by extension.
    ///
    /// Rows are collected before the file is created, so a storage failure
    /// leaves no partial file behind.
    pub fn export_file(&self, path: &Path) -> Result<Vec<Outcome>> {
        log::info!("Exporting to {}", path.display());
        let rows = self.flatten()?;

        let mut writer = Dialect::for_path(path).writer(File::create(path)?);
        writer.write_header()?;
        let mut outcomes = Vec::with_capacity(rows.len());
        for (record, outcome) in rows {
            writer.write_row(record.values())?;
            outcomes.push(outcome);
        }
        writer.finish()?;

        log::info!("Exported {} rows to {}", outcomes.len(), path.display());
        Ok(outcomes)
    }

    /// One record per volume, per title without volumes, per author without
    /// titles, and per borrower without volumes, in that order.
    pub fn flatten(&self) -> Result<Vec<(Record, Outcome)>> {
        let mut rows = Vec::new();

        for title in self.catalog.all_titles()? {
            let base = self.title_record(&title)?;
            let volumes = self.catalog.volumes_for_title(title.id)?;
            if volumes.is_empty() {
                let outcome = Outcome::success(format!(
                    "Exported title {} [{}]",
                    title.title, title.form
                ));
                rows.push((base, outcome));
                continue;
            }
            for volume in volumes {
                let record = self.volume_record(base.clone(), &volume)?;
                let outcome = Outcome::success(format!(
                    "Exported title/volume {} [{}], [{} [{}]]",
                    title.title,
                    title.form,
                    title.title,
                    volume.details()
                ));
                rows.push((record, outcome));
            }
        }

        for author in self.catalog.all_authors()? {
            if self.catalog.titles_by_author(author.id)?.is_empty() {
                let outcome = Outcome::success(format!("Exported author {}", author.name()));
                rows.push((author_record(&author), outcome));
            }
        }

        for borrower in self.catalog.all_borrowers()? {
            if self.catalog.volumes_for_borrower(borrower.id)?.is_empty() {
                let outcome = Outcome::success(format!("Exported borrower {}", borrower.name()));
                let mut record = Record::default();
                fill_borrower(&mut record, &borrower);
                rows.push((record, outcome));
            }
        }

        log::debug!("Flattened catalog into {} rows", rows.len());
        Ok(rows)
    }

    /// Title fields plus the first author's fields under the joined names of
    /// every author.
    fn title_record(&self, title: &Title) -> Result<Record> {
        let mut authors = Vec::with_capacity(title.author_ids.len());
        for id in &title.author_ids {
            if let Some(author) = self.catalog.find_author(*id)? {
                authors.push(author);
            }
        }

        let mut record = authors.first().map(author_record).unwrap_or_default();
        record.author_name = authors
            .iter()
            .map(Author::name)
            .collect::<Vec<_>>()
            .join(";");

        record.title.clone_from(&title.title);
        record.category.clone_from(&title.category);
        record.form.clone_from(&title.form);
        record.publication_year = Some(title.publication_year);
        record.have_read = title.have_read;
        record.title_note.clone_from(&title.note);

        for id in &title.content_ids {
            if let Some(content) = self.catalog.find_title(*id)? {
                record
                    .contents
                    .push(ContentRef::new(content.title, content.form));
            }
        }

        Ok(record)
    }

    fn volume_record(&self, mut record: Record, volume: &Volume) -> Result<Record> {
        record.binding.clone_from(&volume.binding);
        record.publisher.clone_from(&volume.publisher);
        record.publication_date.clone_from(&volume.publication_date);
        record.isbn.clone_from(&volume.isbn);
        record.library_of_congress.clone_from(&volume.library_of_congress);
        record.asin.clone_from(&volume.asin);
        record.volume_note.clone_from(&volume.note);

        if let Some(id) = volume.borrower_id {
            if let Some(borrower) = self.catalog.find_borrower(id)? {
                fill_borrower(&mut record, &borrower);
            }
        }
        Ok(record)
    }
}

fn author_record(author: &Author) -> Record {
    Record {
        author_name: author.name(),
        nationality: author.nationality.clone(),
        birth_place: author.birth_place.clone(),
        birth_date: author.birth_date,
        death_date: author.death_date,
        author_note: author.note.clone(),
        ..Record::default()
    }
}

fn fill_borrower(record: &mut Record, borrower: &Borrower) {
    record.borrower_name = borrower.name();
    record.check_out_date.clone_from(&borrower.check_out_date);
    record.borrower_note.clone_from(&borrower.note);
}
