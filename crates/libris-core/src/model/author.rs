use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::AuthorId;
use crate::model::name::PersonName;

/// A writer, editor, or other person credited on a title.
///
/// Identity is the exact (last name, first name) pair. The titles an
/// author is credited on are not stored here; they are answered by
/// `TitleRepository::titles_by_author`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub last_name: String,
    pub first_name: String,
    pub nationality: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub note: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Author {
    #[must_use]
    pub fn new(name: PersonName) -> Self {
        let now = Utc::now();
        Self {
            id: AuthorId::new(),
            last_name: name.last,
            first_name: name.first,
            nationality: String::new(),
            birth_place: String::new(),
            birth_date: None,
            death_date: None,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `"Last, First"` display form.
    #[must_use]
    pub fn name(&self) -> String {
        PersonName::display(&self.last_name, &self.first_name)
    }

    #[must_use]
    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = nationality.into();
        self
    }

    #[must_use]
    pub fn with_birth_place(mut self, place: impl Into<String>) -> Self {
        self.birth_place = place.into();
        self
    }

    #[must_use]
    pub fn with_birth_date(mut self, date: Option<NaiveDate>) -> Self {
        self.birth_date = date;
        self
    }

    #[must_use]
    pub fn with_death_date(mut self, date: Option<NaiveDate>) -> Self {
        self.death_date = date;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
