//! The fixed catalog of column names, grouped by entity kind.

pub const AUTHOR_NAME: &str = "authorName";
pub const NATIONALITY: &str = "nationality";
pub const BIRTH_PLACE: &str = "birthPlace";
pub const BIRTH_DATE: &str = "birthDate";
pub const DEATH_DATE: &str = "deathDate";
pub const AUTHOR_NOTE: &str = "authorNote";

pub const TITLE: &str = "title";
pub const CATEGORY: &str = "category";
pub const FORM: &str = "form";
pub const PUBLICATION_YEAR: &str = "publicationYear";
pub const HAVE_READ: &str = "haveRead";
pub const TITLE_NOTE: &str = "titleNote";
pub const CONTENTS: &str = "contents";

pub const BINDING: &str = "binding";
pub const PUBLISHER: &str = "publisher";
pub const PUBLICATION_DATE: &str = "publicationDate";
pub const ISBN: &str = "isbn";
pub const LIBRARY_OF_CONGRESS: &str = "libraryOfCongress";
pub const ASIN: &str = "asin";
pub const VOLUME_NOTE: &str = "volumeNote";

pub const BORROWER_NAME: &str = "borrowerName";
pub const CHECK_OUT_DATE: &str = "checkOutDate";
pub const BORROWER_NOTE: &str = "borrowerNote";

pub const AUTHOR_FIELDS: &[&str] = &[
    AUTHOR_NAME,
    NATIONALITY,
    BIRTH_PLACE,
    BIRTH_DATE,
    DEATH_DATE,
    AUTHOR_NOTE,
];

pub const TITLE_FIELDS: &[&str] = &[
    TITLE,
    CATEGORY,
    FORM,
    PUBLICATION_YEAR,
    HAVE_READ,
    TITLE_NOTE,
    CONTENTS,
];

pub const VOLUME_FIELDS: &[&str] = &[
    BINDING,
    PUBLISHER,
    PUBLICATION_DATE,
    ISBN,
    LIBRARY_OF_CONGRESS,
    ASIN,
    VOLUME_NOTE,
];

pub const BORROWER_FIELDS: &[&str] = &[BORROWER_NAME, CHECK_OUT_DATE, BORROWER_NOTE];

/// Which entity a column describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Author,
    Title,
    Volume,
    Borrower,
}

impl FieldGroup {
    pub const ALL: [Self; 4] = [Self::Author, Self::Title, Self::Volume, Self::Borrower];

    /// The group's columns in export order.
    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Author => AUTHOR_FIELDS,
            Self::Title => TITLE_FIELDS,
            Self::Volume => VOLUME_FIELDS,
            Self::Borrower => BORROWER_FIELDS,
        }
    }

    /// The column without which no other column of the group is usable.
    ///
    /// Volumes have none: any volume column is enough.
    #[must_use]
    pub const fn key_field(self) -> Option<&'static str> {
        match self {
            Self::Author => Some(AUTHOR_NAME),
            Self::Title => Some(TITLE),
            Self::Volume => None,
            Self::Borrower => Some(BORROWER_NAME),
        }
    }

    #[must_use]
    pub fn of(field: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.fields().contains(&field))
    }
}

/// Every recognised column, in canonical export order.
pub fn catalog() -> impl Iterator<Item = &'static str> {
    FieldGroup::ALL
        .into_iter()
        .flat_map(|group| group.fields().iter().copied())
}

#[must_use]
pub fn is_known(field: &str) -> bool {
    FieldGroup::of(field).is_some()
}
