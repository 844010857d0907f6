use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row};
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Author, AuthorId, Borrower, BorrowerId, Title, TitleId, Volume, VolumeId};
use crate::repository::{AuthorRepository, BorrowerRepository, TitleRepository, VolumeRepository};

use super::migrations::MIGRATIONS;

const AUTHOR_COLUMNS: &str = "id, last_name, first_name, nationality, birth_place,
    birth_date, death_date, note, created_at, updated_at";

const TITLE_COLUMNS: &str = "id, title, category, form, publication_year, have_read,
    note, created_at, updated_at";

const VOLUME_COLUMNS: &str = "id, title_id, borrower_id, binding, publisher,
    publication_date, isbn, library_of_congress, asin, note, created_at, updated_at";

const BORROWER_COLUMNS: &str = "id, last_name, first_name, check_out_date, note,
    created_at, updated_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row counts per entity kind, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogCounts {
    pub authors: u64,
    pub titles: u64,
    pub volumes: u64,
    pub checked_out: u64,
    pub borrowers: u64,
}

/// A SQLite-backed catalog implementing every repository port.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    /// Count the rows of each entity table.
    pub fn counts(&self) -> Result<CatalogCounts> {
        let count = |sql: &str| -> Result<u64> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or(0))
        };

        Ok(CatalogCounts {
            authors: count("SELECT COUNT(*) FROM authors")?,
            titles: count("SELECT COUNT(*) FROM titles")?,
            volumes: count("SELECT COUNT(*) FROM volumes")?,
            checked_out: count("SELECT COUNT(*) FROM volumes WHERE borrower_id IS NOT NULL")?,
            borrowers: count("SELECT COUNT(*) FROM borrowers")?,
        })
    }
}

// Column decoding
fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| conversion_error(idx, e))
}

fn optional_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| Uuid::parse_str(&t).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| NaiveDate::parse_from_str(&t, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: AuthorId::from_uuid(uuid_at(row, 0)?),
        last_name: row.get(1)?,
        first_name: row.get(2)?,
        nationality: row.get(3)?,
        birth_place: row.get(4)?,
        birth_date: date_at(row, 5)?,
        death_date: date_at(row, 6)?,
        note: row.get(7)?,
        created_at: timestamp_at(row, 8)?,
        updated_at: timestamp_at(row, 9)?,
    })
}

fn title_from_row(row: &Row<'_>) -> rusqlite::Result<Title> {
    Ok(Title {
        id: TitleId::from_uuid(uuid_at(row, 0)?),
        title: row.get(1)?,
        category: row.get(2)?,
        form: row.get(3)?,
        publication_year: row.get(4)?,
        have_read: row.get(5)?,
        note: row.get(6)?,
        author_ids: Vec::new(),
        content_ids: Vec::new(),
        created_at: timestamp_at(row, 7)?,
        updated_at: timestamp_at(row, 8)?,
    })
}

fn volume_from_row(row: &Row<'_>) -> rusqlite::Result<Volume> {
    Ok(Volume {
        id: VolumeId::from_uuid(uuid_at(row, 0)?),
        title_id: TitleId::from_uuid(uuid_at(row, 1)?),
        borrower_id: optional_uuid_at(row, 2)?.map(BorrowerId::from_uuid),
        binding: row.get(3)?,
        publisher: row.get(4)?,
        publication_date: row.get(5)?,
        isbn: row.get(6)?,
        library_of_congress: row.get(7)?,
        asin: row.get(8)?,
        note: row.get(9)?,
        created_at: timestamp_at(row, 10)?,
        updated_at: timestamp_at(row, 11)?,
    })
}

fn borrower_from_row(row: &Row<'_>) -> rusqlite::Result<Borrower> {
    Ok(Borrower {
        id: BorrowerId::from_uuid(uuid_at(row, 0)?),
        last_name: row.get(1)?,
        first_name: row.get(2)?,
        check_out_date: row.get(3)?,
        note: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
        updated_at: timestamp_at(row, 6)?,
    })
}

// Queries shared by the repository impls
impl Database {
    fn query_authors<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Author>> {
        let sql = format!("SELECT {AUTHOR_COLUMNS} FROM authors {clause} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let authors = stmt
            .query_map(params, author_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    }

    fn query_titles<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Title>> {
        let sql = format!("SELECT {TITLE_COLUMNS} FROM titles {clause} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut titles = stmt
            .query_map(params, title_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for title in &mut titles {
            self.load_title_links(title)?;
        }
        Ok(titles)
    }

    fn load_title_links(&self, title: &mut Title) -> Result<()> {
        let id = title.id.to_string();

        let mut stmt = self
            .conn
            .prepare("SELECT author_id FROM title_authors WHERE title_id = ?1 ORDER BY position")?;
        title.author_ids = stmt
            .query_map([&id], |row| uuid_at(row, 0).map(AuthorId::from_uuid))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT content_id FROM title_contents WHERE collection_id = ?1 ORDER BY position",
        )?;
        title.content_ids = stmt
            .query_map([&id], |row| uuid_at(row, 0).map(TitleId::from_uuid))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(())
    }

    fn query_volumes<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Volume>> {
        let sql = format!("SELECT {VOLUME_COLUMNS} FROM volumes {clause} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let volumes = stmt
            .query_map(params, volume_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(volumes)
    }

    fn query_borrowers<P: Params>(&self, clause: &str, params: P) -> Result<Vec<Borrower>> {
        let sql = format!("SELECT {BORROWER_COLUMNS} FROM borrowers {clause} ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let borrowers = stmt
            .query_map(params, borrower_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(borrowers)
    }
}

impl AuthorRepository for Database {
    fn find_authors_by_name(&self, last: &str, first: &str) -> Result<Vec<Author>> {
        self.query_authors("WHERE last_name = ?1 AND first_name = ?2", [last, first])
    }

    fn find_author(&self, id: AuthorId) -> Result<Option<Author>> {
        let sql = format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?1");
        let author = self
            .conn
            .query_row(&sql, [id.to_string()], author_from_row)
            .optional()?;
        Ok(author)
    }

    fn all_authors(&self) -> Result<Vec<Author>> {
        self.query_authors("", [])
    }

    fn save_author(&self, author: Author) -> Result<Author> {
        self.conn.execute(
            "INSERT INTO authors (
                id, last_name, first_name, nationality, birth_place,
                birth_date, death_date, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                last_name = excluded.last_name, first_name = excluded.first_name,
                nationality = excluded.nationality, birth_place = excluded.birth_place,
                birth_date = excluded.birth_date, death_date = excluded.death_date,
                note = excluded.note, updated_at = excluded.updated_at",
            rusqlite::params![
                author.id.to_string(),
                author.last_name,
                author.first_name,
                author.nationality,
                author.birth_place,
                format_date(author.birth_date),
                format_date(author.death_date),
                author.note,
                author.created_at.to_rfc3339(),
                author.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(author)
    }

    fn delete_author(&self, id: AuthorId) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM title_authors WHERE author_id = ?1", [id.to_string()])?;
        tx.execute("DELETE FROM authors WHERE id = ?1", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

impl TitleRepository for Database {
    fn find_titles_by_authors(&self, title: &str, authors: &[AuthorId]) -> Result<Vec<Title>> {
        let wanted: HashSet<AuthorId> = authors.iter().copied().collect();
        let titles = self
            .query_titles("WHERE title = ?1", [title])?
            .into_iter()
            .filter(|t| t.author_ids.iter().copied().collect::<HashSet<_>>() == wanted)
            .collect();
        Ok(titles)
    }

    fn find_titles_by_form(&self, title: &str, form: &str) -> Result<Vec<Title>> {
        self.query_titles("WHERE title = ?1 AND form = ?2", [title, form])
    }

    fn find_title(&self, id: TitleId) -> Result<Option<Title>> {
        let sql = format!("SELECT {TITLE_COLUMNS} FROM titles WHERE id = ?1");
        let title = self
            .conn
            .query_row(&sql, [id.to_string()], title_from_row)
            .optional()?;

        match title {
            Some(mut title) => {
                self.load_title_links(&mut title)?;
                Ok(Some(title))
            }
            None => Ok(None),
        }
    }

    fn all_titles(&self) -> Result<Vec<Title>> {
        self.query_titles("", [])
    }

    fn titles_by_author(&self, author: AuthorId) -> Result<Vec<Title>> {
        self.query_titles(
            "WHERE id IN (SELECT title_id FROM title_authors WHERE author_id = ?1)",
            [author.to_string()],
        )
    }

    fn collected_in(&self, content: TitleId) -> Result<Vec<Title>> {
        self.query_titles(
            "WHERE id IN (SELECT collection_id FROM title_contents WHERE content_id = ?1)",
            [content.to_string()],
        )
    }

    fn save_title(&self, title: Title) -> Result<Title> {
        let id = title.id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO titles (
                id, title, category, form, publication_year, have_read,
                note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title, category = excluded.category,
                form = excluded.form, publication_year = excluded.publication_year,
                have_read = excluded.have_read, note = excluded.note,
                updated_at = excluded.updated_at",
            rusqlite::params![
                id,
                title.title,
                title.category,
                title.form,
                title.publication_year,
                title.have_read,
                title.note,
                title.created_at.to_rfc3339(),
                title.updated_at.to_rfc3339(),
            ],
        )?;

        tx.execute("DELETE FROM title_authors WHERE title_id = ?1", [&id])?;
        for (position, author) in title.author_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO title_authors (title_id, author_id, position) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, author.to_string(), position as i64],
            )?;
        }

        tx.execute("DELETE FROM title_contents WHERE collection_id = ?1", [&id])?;
        for (position, content) in title.content_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO title_contents (collection_id, content_id, position) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, content.to_string(), position as i64],
            )?;
        }

        tx.commit()?;
        Ok(title)
    }

    fn delete_title(&self, id: TitleId) -> Result<()> {
        let id = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM volumes WHERE title_id = ?1", [&id])?;
        tx.execute("DELETE FROM title_authors WHERE title_id = ?1", [&id])?;
        tx.execute(
            "DELETE FROM title_contents WHERE collection_id = ?1 OR content_id = ?1",
            [&id],
        )?;
        tx.execute("DELETE FROM titles WHERE id = ?1", [&id])?;
        tx.commit()?;
        Ok(())
    }
}

impl VolumeRepository for Database {
    fn volumes_for_title(&self, title: TitleId) -> Result<Vec<Volume>> {
        self.query_volumes("WHERE title_id = ?1", [title.to_string()])
    }

    fn volumes_for_borrower(&self, borrower: BorrowerId) -> Result<Vec<Volume>> {
        self.query_volumes("WHERE borrower_id = ?1", [borrower.to_string()])
    }

    /// A volume keeps the title it was created under; saving it with a
    /// different `title_id` fails with `InvalidData`.
    fn save_volume(&self, volume: Volume) -> Result<Volume> {
        let title_id = volume.title_id.to_string();
        let title_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM titles WHERE id = ?1)",
            [&title_id],
            |row| row.get(0),
        )?;
        if !title_exists {
            return Err(Error::NotFound {
                entity: "title",
                id: title_id,
            });
        }

        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT title_id FROM volumes WHERE id = ?1",
                [volume.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if owner.is_some_and(|owner| owner != title_id) {
            return Err(Error::InvalidData(format!(
                "volume {} cannot move to title {}",
                volume.id, title_id
            )));
        }

        self.conn.execute(
            "INSERT INTO volumes (
                id, title_id, borrower_id, binding, publisher, publication_date,
                isbn, library_of_congress, asin, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                borrower_id = excluded.borrower_id, binding = excluded.binding,
                publisher = excluded.publisher, publication_date = excluded.publication_date,
                isbn = excluded.isbn, library_of_congress = excluded.library_of_congress,
                asin = excluded.asin, note = excluded.note, updated_at = excluded.updated_at",
            rusqlite::params![
                volume.id.to_string(),
                title_id,
                volume.borrower_id.map(|id| id.to_string()),
                volume.binding,
                volume.publisher,
                volume.publication_date,
                volume.isbn,
                volume.library_of_congress,
                volume.asin,
                volume.note,
                volume.created_at.to_rfc3339(),
                volume.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(volume)
    }

    fn delete_volume(&self, id: VolumeId) -> Result<()> {
        self.conn
            .execute("DELETE FROM volumes WHERE id = ?1", [id.to_string()])?;
        Ok(())
    }
}

impl BorrowerRepository for Database {
    fn find_borrowers_by_name(&self, last: &str, first: &str) -> Result<Vec<Borrower>> {
        self.query_borrowers("WHERE last_name = ?1 AND first_name = ?2", [last, first])
    }

    fn find_borrower(&self, id: BorrowerId) -> Result<Option<Borrower>> {
        let sql = format!("SELECT {BORROWER_COLUMNS} FROM borrowers WHERE id = ?1");
        let borrower = self
            .conn
            .query_row(&sql, [id.to_string()], borrower_from_row)
            .optional()?;
        Ok(borrower)
    }

    fn all_borrowers(&self) -> Result<Vec<Borrower>> {
        self.query_borrowers("", [])
    }

    fn save_borrower(&self, borrower: Borrower) -> Result<Borrower> {
        self.conn.execute(
            "INSERT INTO borrowers (
                id, last_name, first_name, check_out_date, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                last_name = excluded.last_name, first_name = excluded.first_name,
                check_out_date = excluded.check_out_date, note = excluded.note,
                updated_at = excluded.updated_at",
            rusqlite::params![
                borrower.id.to_string(),
                borrower.last_name,
                borrower.first_name,
                borrower.check_out_date,
                borrower.note,
                borrower.created_at.to_rfc3339(),
                borrower.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(borrower)
    }

    fn delete_borrower(&self, id: BorrowerId) -> Result<()> {
        let id = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("UPDATE volumes SET borrower_id = NULL WHERE borrower_id = ?1", [&id])?;
        tx.execute("DELETE FROM borrowers WHERE id = ?1", [&id])?;
        tx.commit()?;
        Ok(())
    }
}
