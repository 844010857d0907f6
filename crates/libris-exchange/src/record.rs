//! One normalized row of import/export data.

use chrono::NaiveDate;
use std::fmt;

use libris_core::model::PersonName;

use crate::fields;

const ISO_FORMAT: &str = "%Y-%m-%d";
const US_FORMAT: &str = "%m/%d/%Y";

/// A `Title::Form` reference inside a `contents` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub title: String,
    pub form: String,
}

impl ContentRef {
    #[must_use]
    pub fn new(title: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            form: form.into(),
        }
    }

    /// Parse `"Title::Form//Title::Form"`. Blank segments are skipped.
    #[must_use]
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split("//")
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| match segment.split_once("::") {
                Some((title, form)) => Self::new(title.trim(), form.trim()),
                None => Self::new(segment.trim(), ""),
            })
            .collect()
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.title, self.form)
    }
}

/// A flattened row spanning all four field groups.
///
/// Absent columns and blank cells read as empty strings, `false`, or
/// `None`. Built from a source row by [`Record::from_lookup`] on import,
/// and field by field by the exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub author_name: String,
    pub nationality: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub author_note: String,

    pub title: String,
    pub category: String,
    pub form: String,
    /// `None` when the cell was blank; import treats that as year 0.
    pub publication_year: Option<i32>,
    pub have_read: bool,
    pub title_note: String,
    pub contents: Vec<ContentRef>,

    pub binding: String,
    pub publisher: String,
    pub publication_date: String,
    pub isbn: String,
    pub library_of_congress: String,
    pub asin: String,
    pub volume_note: String,

    pub borrower_name: String,
    pub check_out_date: String,
    pub borrower_note: String,
}

impl Record {
    /// Build a record from a cell lookup keyed by column name.
    ///
    /// The lookup returns `None` for columns the file does not carry.
    pub fn from_lookup<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let text = |field: &str| lookup(field).map(str::trim).unwrap_or_default().to_string();

        Self {
            author_name: text(fields::AUTHOR_NAME),
            nationality: text(fields::NATIONALITY),
            birth_place: text(fields::BIRTH_PLACE),
            birth_date: parse_date(&text(fields::BIRTH_DATE)),
            death_date: parse_date(&text(fields::DEATH_DATE)),
            author_note: text(fields::AUTHOR_NOTE),

            title: text(fields::TITLE),
            category: text(fields::CATEGORY),
            form: text(fields::FORM),
            publication_year: parse_year(&text(fields::PUBLICATION_YEAR)),
            have_read: parse_bool(&text(fields::HAVE_READ)),
            title_note: text(fields::TITLE_NOTE),
            contents: ContentRef::parse_list(&text(fields::CONTENTS)),

            binding: text(fields::BINDING),
            publisher: text(fields::PUBLISHER),
            publication_date: text(fields::PUBLICATION_DATE),
            isbn: text(fields::ISBN),
            library_of_congress: text(fields::LIBRARY_OF_CONGRESS),
            asin: text(fields::ASIN),
            volume_note: text(fields::VOLUME_NOTE),

            borrower_name: text(fields::BORROWER_NAME),
            check_out_date: text(fields::CHECK_OUT_DATE),
            borrower_note: text(fields::BORROWER_NOTE),
        }
    }

    /// The names listed in `authorName`, split on `;`.
    #[must_use]
    pub fn author_names(&self) -> Vec<(String, PersonName)> {
        self.author_name
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| (name.to_string(), PersonName::parse(name)))
            .collect()
    }

    #[must_use]
    pub fn borrower(&self) -> PersonName {
        PersonName::parse(&self.borrower_name)
    }

    /// Publication year with a blank cell read as 0.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.publication_year.unwrap_or(0)
    }

    /// Cell values in canonical column order, formatted for output.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        let contents: Vec<String> = self.contents.iter().map(ToString::to_string).collect();

        vec![
            self.author_name.clone(),
            self.nationality.clone(),
            self.birth_place.clone(),
            format_date(self.birth_date),
            format_date(self.death_date),
            self.author_note.clone(),
            self.title.clone(),
            self.category.clone(),
            self.form.clone(),
            self.publication_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
            format_bool(self.have_read).to_string(),
            self.title_note.clone(),
            contents.join("//"),
            self.binding.clone(),
            self.publisher.clone(),
            self.publication_date.clone(),
            self.isbn.clone(),
            self.library_of_congress.clone(),
            self.asin.clone(),
            self.volume_note.clone(),
            self.borrower_name.clone(),
            self.check_out_date.clone(),
            self.borrower_note.clone(),
        ]
    }
}

/// `YYYY-MM-DD` or `MM/DD/YYYY`; anything else is no date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if has_shape(text, "dddd-dd-dd") {
        NaiveDate::parse_from_str(text, ISO_FORMAT).ok()
    } else if has_shape(text, "dd/dd/dddd") {
        NaiveDate::parse_from_str(text, US_FORMAT).ok()
    } else {
        None
    }
}

/// Match `text` against a pattern where `d` is any ASCII digit and every
/// other character must appear literally.
fn has_shape(text: &str, pattern: &str) -> bool {
    text.len() == pattern.len()
        && text.bytes().zip(pattern.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(ISO_FORMAT).to_string())
        .unwrap_or_default()
}

/// True when the text starts with `y` or `t`, ignoring case.
#[must_use]
pub fn parse_bool(text: &str) -> bool {
    text.trim()
        .chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'y' | 't'))
}

#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        "N"
    }
}

fn parse_year(text: &str) -> Option<i32> {
    if text.is_empty() {
        return None;
    }
    match text.parse() {
        Ok(year) => Some(year),
        Err(_) => {
            log::warn!("Ignoring non-numeric publication year \"{}\"", text);
            Some(0)
        }
    }
}
