//! End-to-end import/export through files on disk.

use std::fs;
use std::path::Path;

use libris_core::model::{Author, PersonName, Title, Volume};
use libris_core::schema::Database;
use libris_core::{AuthorRepository, BorrowerRepository, TitleRepository, VolumeRepository};
use libris_exchange::{ExchangeError, Exporter, Importer, Status};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn import(db: &Database, path: &Path) -> Vec<libris_exchange::Outcome> {
    Importer::new(db).import_file(path).unwrap()
}

#[test]
fn test_csv_round_trip_reuses_title_and_adds_volumes() {
    let dir = TempDir::new().unwrap();
    let source = Database::open_in_memory().unwrap();
    let title = source
        .save_title(
            Title::new("Moby Dick")
                .with_category("Fiction")
                .with_form("Novel")
                .with_publication_year(1851)
                .with_have_read(true)
                .with_note("The \"whale\" one"),
        )
        .unwrap();
    for binding in ["Hard", "Paper"] {
        let mut volume = Volume::new(title.id);
        volume.binding = binding.to_string();
        source.save_volume(volume).unwrap();
    }

    let path = dir.path().join("catalog.csv");
    let exported = Exporter::new(&source).export_file(&path).unwrap();
    assert_eq!(exported.len(), 2);
    assert!(exported.iter().all(|o| o.status == Status::Success));

    let header = fs::read_to_string(&path).unwrap();
    assert!(header.starts_with("\"authorName\",\"nationality\""));

    let outcomes = import(&source, &path);
    assert!(outcomes.iter().all(|o| o.status == Status::Success));

    let titles = source.all_titles().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].category, "Fiction");
    assert_eq!(titles[0].publication_year, 1851);
    assert!(titles[0].have_read);
    assert_eq!(titles[0].note, "The \"whale\" one");
    assert_eq!(source.volumes_for_title(title.id).unwrap().len(), 4);

    let fresh = Database::open_in_memory().unwrap();
    import(&fresh, &path);
    let rebuilt = fresh.all_titles().unwrap();
    assert_eq!(rebuilt.len(), 1);
    assert_eq!(rebuilt[0].title, "Moby Dick");
    assert_eq!(rebuilt[0].form, "Novel");
    assert_eq!(rebuilt[0].note, "The \"whale\" one");
    assert_eq!(fresh.volumes_for_title(rebuilt[0].id).unwrap().len(), 2);
}

#[test]
fn test_tab_round_trip_with_authors_and_borrower() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "books.txt",
        "authorName\ttitle\tbinding\tborrowerName\tcheckOutDate\n\
         Pratchett, Terry; Gaiman, Neil\tGood Omens\tHard\tDoe, Jo\t2024-01-05\n",
    );
    let source = Database::open_in_memory().unwrap();
    import(&source, &path);
    assert_eq!(source.all_authors().unwrap().len(), 2);

    let out = dir.path().join("export.tsv");
    Exporter::new(&source).export_file(&out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Pratchett, Terry;Gaiman, Neil\t"));
    assert!(!lines[1].contains('"'));

    let fresh = Database::open_in_memory().unwrap();
    import(&fresh, &out);
    assert_eq!(fresh.all_authors().unwrap().len(), 2);
    let borrower = fresh.all_borrowers().unwrap().remove(0);
    assert_eq!(borrower.name(), "Doe, Jo");
    assert_eq!(fresh.volumes_for_borrower(borrower.id).unwrap().len(), 1);
}

#[test]
fn test_invalid_headers_import_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.csv", "publisher\nHarper\n");
    let db = Database::open_in_memory().unwrap();

    let error = Importer::new(&db).import_file(&path).unwrap_err();
    assert!(matches!(error, ExchangeError::InvalidHeaders(_)));
    let outcomes = error.into_outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        outcomes[0].message,
        "Unable to load file that contains neither authorName nor title fields"
    );
    assert!(db.all_titles().unwrap().is_empty());
}

#[test]
fn test_malformed_csv_imports_nothing() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();

    for (name, contents, line) in [
        ("open.csv", "title,form\n\"Moby Dick,Novel\nBeowulf,Epic\n", 2),
        ("stray.csv", "title,form\nTypee,Novel\n\"A\"b,Epic\n", 3),
    ] {
        let path = write(&dir, name, contents);
        let error = Importer::new(&db).import_file(&path).unwrap_err();
        match error {
            ExchangeError::MalformedCsv { line: found, .. } => assert_eq!(found, line, "{name}"),
            other => panic!("expected malformed CSV for {name}, got {other:?}"),
        }
    }

    assert!(db.all_titles().unwrap().is_empty());
}

#[test]
fn test_lenient_csv_quoting_imports() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "lenient.csv",
        "title,form\n\"Moby Dick\" ,Novel\nThe \"Encantadas\",Sketch\n",
    );
    let db = Database::open_in_memory().unwrap();
    let outcomes = import(&db, &path);

    assert!(outcomes.iter().all(|o| o.status == Status::Success));
    assert_eq!(db.find_titles_by_form("Moby Dick", "Novel").unwrap().len(), 1);
    assert_eq!(
        db.find_titles_by_form("The \"Encantadas\"", "Sketch").unwrap().len(),
        1
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    let error = Importer::new(&db)
        .import_file(&dir.path().join("nope.csv"))
        .unwrap_err();
    assert!(matches!(error, ExchangeError::Io(_)));
}

#[test]
fn test_tab_quotes_are_collapsed_on_import() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "quotes.txt", "title\ttitleNote\nQuoted\t\"He said \"\"hi\"\"\"\n");
    let db = Database::open_in_memory().unwrap();
    import(&db, &path);

    let title = db.all_titles().unwrap().remove(0);
    assert_eq!(title.note, "He said \"hi\"");
}

#[test]
fn test_ambiguous_author_row_leaves_others_intact() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    db.save_author(Author::new(PersonName::new("Smith", "Pat"))).unwrap();
    db.save_author(Author::new(PersonName::new("Smith", "Pat"))).unwrap();

    let path = write(
        &dir,
        "rows.csv",
        "authorName,title,isbn\n\"Smith, Pat\",Lost,1\n\"Doe, Jane\",Found,2\n\"Doe, Jane\",Also Found,3\n",
    );
    let outcomes = import(&db, &path);

    assert_eq!(outcomes[0].status, Status::Error);
    let titles: Vec<String> = db.all_titles().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Found", "Also Found"]);
    assert_eq!(db.find_authors_by_name("Doe", "Jane").unwrap().len(), 1);
}

#[test]
fn test_database_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("libris.db");
    let csv = write(&dir, "one.csv", "title,form\nBeowulf,Epic\n");

    {
        let db = Database::open(&db_path).unwrap();
        import(&db, &csv);
    }
    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.find_titles_by_form("Beowulf", "Epic").unwrap().len(), 1);
}
