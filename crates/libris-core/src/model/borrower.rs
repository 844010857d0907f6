use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::BorrowerId;
use crate::model::name::PersonName;

/// Someone who has volumes checked out.
///
/// Identity is the exact (last name, first name) pair. The checked-out
/// volumes are the ones whose `borrower_id` points here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub last_name: String,
    pub first_name: String,

    /// Free-form date text, kept exactly as entered.
    pub check_out_date: String,
    pub note: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Borrower {
    #[must_use]
    pub fn new(name: PersonName) -> Self {
        let now = Utc::now();
        Self {
            id: BorrowerId::new(),
            last_name: name.last,
            first_name: name.first,
            check_out_date: String::new(),
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        PersonName::display(&self.last_name, &self.first_name)
    }

    #[must_use]
    pub fn with_check_out_date(mut self, date: impl Into<String>) -> Self {
        self.check_out_date = date.into();
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
