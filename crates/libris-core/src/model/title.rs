use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AuthorId, TitleId};

/// A catalogued work: a novel, an anthology, a story collected in one.
///
/// A title owns its volumes; those are looked up through
/// `VolumeRepository::volumes_for_title` rather than held here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    pub title: String,
    pub category: String,
    pub form: String,
    pub publication_year: i32,
    pub have_read: bool,
    pub note: String,

    /// Credited authors, in credit order.
    pub author_ids: Vec<AuthorId>,

    /// Titles this one collects, in table-of-contents order.
    pub content_ids: Vec<TitleId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Title {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TitleId::new(),
            title: title.into(),
            category: String::new(),
            form: String::new(),
            publication_year: 0,
            have_read: false,
            note: String::new(),
            author_ids: Vec::new(),
            content_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = form.into();
        self
    }

    #[must_use]
    pub fn with_publication_year(mut self, year: i32) -> Self {
        self.publication_year = year;
        self
    }

    #[must_use]
    pub fn with_have_read(mut self, have_read: bool) -> Self {
        self.have_read = have_read;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    #[must_use]
    pub fn with_authors(mut self, authors: impl IntoIterator<Item = AuthorId>) -> Self {
        for author in authors {
            self.add_author(author);
        }
        self
    }

    /// Credit an author. Crediting the same author twice is a no-op.
    pub fn add_author(&mut self, author: AuthorId) {
        if !self.author_ids.contains(&author) {
            self.author_ids.push(author);
        }
    }

    /// Append a collected title. Adding the same title twice is a no-op.
    pub fn add_content(&mut self, content: TitleId) {
        if !self.content_ids.contains(&content) {
            self.content_ids.push(content);
        }
    }
}
