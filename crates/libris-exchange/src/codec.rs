//! Row-level file I/O for the two supported dialects.
//!
//! `.csv` files are RFC 4180 with a header line. Every other extension is
//! read as tab-delimited text whose first line holds the headers.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{ExchangeError, Result};
use crate::fields;

/// `\"` or `""` inside a quoted tab-delimited field.
#[allow(clippy::expect_used)]
static ESCAPED_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\"]""#).expect("escaped quote pattern is valid"));

/// One source row keyed by header name.
pub type Row = HashMap<String, String>;

/// The header line and data rows of a source file, in file order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// File dialect, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Csv,
    Tab,
}

impl Dialect {
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Tab,
        }
    }

    /// Read a whole table from `input`.
    pub fn read<R: Read>(self, input: R) -> Result<Table> {
        match self {
            Self::Csv => read_csv(input),
            Self::Tab => read_tab(input),
        }
    }

    pub fn writer<W: Write>(self, output: W) -> RowWriter<W> {
        match self {
            Self::Csv => RowWriter::Csv(
                csv::WriterBuilder::new()
                    .quote_style(csv::QuoteStyle::Always)
                    .terminator(csv::Terminator::Any(b'\n'))
                    .from_writer(output),
            ),
            Self::Tab => RowWriter::Tab(BufWriter::new(output)),
        }
    }
}

/// Open `path`, pick its dialect, and read it. The file is closed before
/// this returns.
pub fn read_file(path: &Path) -> Result<Table> {
    let dialect = Dialect::for_path(path);
    log::debug!("Reading {} as {:?}", path.display(), dialect);
    let file = File::open(path)?;
    dialect.read(file)
}

fn read_csv<R: Read>(mut input: R) -> Result<Table> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    check_quotes(&text)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

#[derive(Clone, Copy)]
enum QuoteState {
    FieldStart,
    /// Quotes here are literal text.
    Unquoted,
    Quoted { opened_at: usize },
    /// A quote seen inside a quoted field: either the closing quote or the
    /// first half of `""`.
    QuoteInQuoted { opened_at: usize },
    /// Spaces or tabs between a closing quote and the next delimiter.
    AfterQuoted,
}

/// Reject quoting that RFC 4180 readers refuse: a quoted field left open at
/// end of input, or non-blank text between a closing quote and the next
/// delimiter. Quotes inside an unquoted field are kept as literal text.
/// Lines are 1-based.
fn check_quotes(text: &str) -> Result<()> {
    let malformed = |line, problem| Err(ExchangeError::MalformedCsv { line, problem });

    let mut state = QuoteState::FieldStart;
    let mut line = 1;
    for c in text.chars() {
        state = match (state, c) {
            (QuoteState::Quoted { opened_at }, '"') => QuoteState::QuoteInQuoted { opened_at },
            (QuoteState::Quoted { .. }, _) => state,
            (QuoteState::QuoteInQuoted { opened_at }, '"') => QuoteState::Quoted { opened_at },
            (QuoteState::FieldStart, '"') => QuoteState::Quoted { opened_at: line },
            (_, ',' | '\r' | '\n') => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted { .. } | QuoteState::AfterQuoted, ' ' | '\t') => {
                QuoteState::AfterQuoted
            }
            (QuoteState::QuoteInQuoted { .. } | QuoteState::AfterQuoted, _) => {
                return malformed(line, "text after the closing quote of a field");
            }
            (QuoteState::FieldStart | QuoteState::Unquoted, _) => QuoteState::Unquoted,
        };
        if c == '\n' {
            line += 1;
        }
    }

    match state {
        QuoteState::Quoted { opened_at } => malformed(opened_at, "unterminated quoted field"),
        _ => Ok(()),
    }
}

fn read_tab<R: Read>(mut input: R) -> Result<Table> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let mut lines = text.lines();
    let Some(header_line) = lines.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_line
        .split('\t')
        .map(|h| h.trim().to_string())
        .collect();

    let rows = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            headers
                .iter()
                .zip(line.split('\t'))
                .map(|(header, field)| (header.clone(), clean_tab_field(field)))
                .collect()
        })
        .collect();

    Ok(Table { headers, rows })
}

/// Strip surrounding quotes from a tab-delimited field, collapse `\"` and
/// `""` to `"`, then trim.
#[must_use]
pub fn clean_tab_field(field: &str) -> String {
    let unquoted = match field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => ESCAPED_QUOTE.replace_all(inner, "\"").into_owned(),
        None => field.to_string(),
    };
    unquoted.trim().to_string()
}

/// Writes rows in one dialect.
pub enum RowWriter<W: Write> {
    /// Every value quoted, inner quotes doubled.
    Csv(csv::Writer<W>),
    /// Values joined with tabs, no quoting at all.
    Tab(BufWriter<W>),
}

impl<W: Write> fmt::Debug for RowWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(_) => f.write_str("RowWriter::Csv"),
            Self::Tab(_) => f.write_str("RowWriter::Tab"),
        }
    }
}

impl<W: Write> RowWriter<W> {
    pub fn write_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self {
            Self::Csv(writer) => {
                writer.write_record(values.into_iter().map(|v| v.as_ref().to_string()))?;
            }
            Self::Tab(writer) => {
                let line: Vec<String> = values
                    .into_iter()
                    .map(|v| v.as_ref().to_string())
                    .collect();
                writeln!(writer, "{}", line.join("\t"))?;
            }
        }
        Ok(())
    }

    /// The full catalog as a header line.
    pub fn write_header(&mut self) -> Result<()> {
        self.write_row(fields::catalog())
    }

    /// Flush buffered output.
    pub fn finish(self) -> Result<()> {
        match self {
            Self::Csv(mut writer) => writer.flush()?,
            Self::Tab(mut writer) => writer.flush()?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_to_string(dialect: Dialect, rows: &[Vec<&str>]) -> String {
        let mut buffer = Vec::new();
        {
            let mut writer = dialect.writer(&mut buffer);
            for row in rows {
                writer.write_row(row.iter().copied()).unwrap();
            }
            writer.finish().unwrap();
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_dialect_for_path() {
        assert_eq!(Dialect::for_path(&PathBuf::from("books.csv")), Dialect::Csv);
        assert_eq!(Dialect::for_path(&PathBuf::from("BOOKS.CSV")), Dialect::Csv);
        assert_eq!(Dialect::for_path(&PathBuf::from("books.txt")), Dialect::Tab);
        assert_eq!(Dialect::for_path(&PathBuf::from("books")), Dialect::Tab);
    }

    #[test]
    fn test_clean_tab_field_collapses_quotes() {
        assert_eq!(clean_tab_field(r#""He said ""hi""""#), r#"He said "hi""#);
        assert_eq!(clean_tab_field(r#""He said \"hi\"""#), r#"He said "hi""#);
        assert_eq!(clean_tab_field("  plain  "), "plain");
        assert_eq!(clean_tab_field("\""), "\"");
        assert_eq!(clean_tab_field(r#"a "quoted" word"#), r#"a "quoted" word"#);
    }

    #[test]
    fn test_read_tab_maps_positions() {
        let text = "title\tform\tbinding\nMoby Dick\tNovel\t\"Hard\"\t extra\nBeowulf\n\n";
        let table = Dialect::Tab.read(text.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["title", "form", "binding"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["binding"], "Hard");
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[1]["title"], "Beowulf");
        assert!(!table.rows[1].contains_key("form"));
    }

    #[test]
    fn test_read_tab_empty_input() {
        let table = Dialect::Tab.read("".as_bytes()).unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_read_csv_trims_values() {
        let text = "title,form\n\" Moby Dick \",Novel\nBeowulf\n";
        let table = Dialect::Csv.read(text.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["title", "form"]);
        assert_eq!(table.rows[0]["title"], "Moby Dick");
        assert_eq!(table.rows[1]["title"], "Beowulf");
        assert!(!table.rows[1].contains_key("form"));
    }

    #[test]
    fn test_unterminated_quote_is_rejected() {
        let text = "title,form\n\"Moby Dick,Novel\nBeowulf,Epic\n";
        match Dialect::Csv.read(text.as_bytes()) {
            Err(ExchangeError::MalformedCsv { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed CSV, got {other:?}"),
        }
    }

    #[test]
    fn test_text_after_closing_quote_is_rejected() {
        for (text, expected_line) in [
            ("title,form\nTypee,Novel\n\"A\"b,Epic\n", 3),
            ("title,form\n\"Moby Dick\"  x,Novel\n", 2),
            ("title,form\n\"Moby Dick\" \"\",Novel\n", 2),
        ] {
            match Dialect::Csv.read(text.as_bytes()) {
                Err(ExchangeError::MalformedCsv { line, .. }) => assert_eq!(line, expected_line),
                other => panic!("expected malformed CSV for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_quotes_inside_unquoted_field_are_literal() {
        let text = "title,form\nMoby \"Dick\" x,Novel\nMoby Dick, \"Novel\"\n";
        let table = Dialect::Csv.read(text.as_bytes()).unwrap();
        assert_eq!(table.rows[0]["title"], r#"Moby "Dick" x"#);
        assert_eq!(table.rows[0]["form"], "Novel");
        assert_eq!(table.rows[1]["form"], r#""Novel""#);
    }

    #[test]
    fn test_blanks_after_closing_quote_are_dropped() {
        let text = "title,form\n\"Moby Dick\" ,Novel\n\"Typee\"\t,\"Novel\"  \n";
        let table = Dialect::Csv.read(text.as_bytes()).unwrap();
        assert_eq!(table.rows[0]["title"], "Moby Dick");
        assert_eq!(table.rows[0]["form"], "Novel");
        assert_eq!(table.rows[1]["title"], "Typee");
        assert_eq!(table.rows[1]["form"], "Novel");
    }

    #[test]
    fn test_well_formed_quoting_is_accepted() {
        let text = "title,titleNote\n\"A, B\",\"x \"\"y\"\"\"\r\n\"multi\nline\",\n,\"\"\n";
        let table = Dialect::Csv.read(text.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0]["titleNote"], r#"x "y""#);
        assert_eq!(table.rows[1]["title"], "multi\nline");
    }

    #[test]
    fn test_write_csv_quotes_everything() {
        let out = write_to_string(Dialect::Csv, &[vec!["title", "note"], vec![r#"He said "hi""#, ""]]);
        assert_eq!(out, "\"title\",\"note\"\n\"He said \"\"hi\"\"\",\"\"\n");
    }

    #[test]
    fn test_write_tab_does_not_quote() {
        let out = write_to_string(Dialect::Tab, &[vec!["title", "note"], vec![r#"He said "hi""#, ""]]);
        assert_eq!(out, "title\tnote\nHe said \"hi\"\t\n");
    }

    #[test]
    fn test_csv_written_values_read_back() {
        let out = write_to_string(Dialect::Csv, &[vec!["title", "titleNote"], vec!["A, B", r#"x "y""#]]);
        let table = Dialect::Csv.read(out.as_bytes()).unwrap();
        assert_eq!(table.rows[0]["title"], "A, B");
        assert_eq!(table.rows[0]["titleNote"], r#"x "y""#);
    }
}
