/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Authors
CREATE TABLE IF NOT EXISTS authors (
    id TEXT PRIMARY KEY,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    nationality TEXT NOT NULL DEFAULT '',
    birth_place TEXT NOT NULL DEFAULT '',
    birth_date TEXT,
    death_date TEXT,
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_authors_name ON authors(last_name, first_name);

-- Titles
CREATE TABLE IF NOT EXISTS titles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT '',
    form TEXT NOT NULL DEFAULT '',
    publication_year INTEGER NOT NULL DEFAULT 0,
    have_read INTEGER NOT NULL DEFAULT 0,
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_titles_title ON titles(title);
CREATE INDEX IF NOT EXISTS idx_titles_title_form ON titles(title, form);

-- Title credits (ordered many-to-many)
CREATE TABLE IF NOT EXISTS title_authors (
    title_id TEXT NOT NULL REFERENCES titles(id),
    author_id TEXT NOT NULL REFERENCES authors(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (title_id, author_id)
);

CREATE INDEX IF NOT EXISTS idx_title_authors_author_id ON title_authors(author_id);

-- Collection contents (ordered many-to-many between titles)
CREATE TABLE IF NOT EXISTS title_contents (
    collection_id TEXT NOT NULL REFERENCES titles(id),
    content_id TEXT NOT NULL REFERENCES titles(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (collection_id, content_id)
);

CREATE INDEX IF NOT EXISTS idx_title_contents_content_id ON title_contents(content_id);

-- Borrowers
CREATE TABLE IF NOT EXISTS borrowers (
    id TEXT PRIMARY KEY,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    check_out_date TEXT NOT NULL DEFAULT '',
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_borrowers_name ON borrowers(last_name, first_name);

-- Volumes (owned by exactly one title)
CREATE TABLE IF NOT EXISTS volumes (
    id TEXT PRIMARY KEY,
    title_id TEXT NOT NULL REFERENCES titles(id),
    borrower_id TEXT REFERENCES borrowers(id),
    binding TEXT NOT NULL DEFAULT '',
    publisher TEXT NOT NULL DEFAULT '',
    publication_date TEXT NOT NULL DEFAULT '',
    isbn TEXT NOT NULL DEFAULT '',
    library_of_congress TEXT NOT NULL DEFAULT '',
    asin TEXT NOT NULL DEFAULT '',
    note TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_volumes_title_id ON volumes(title_id);
CREATE INDEX IF NOT EXISTS idx_volumes_borrower_id ON volumes(borrower_id);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
