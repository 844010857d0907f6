//! Header-row validation.

use std::collections::HashSet;

use crate::error::ExchangeError;
use crate::fields::{self, FieldGroup};

/// The validated column names of a source file.
#[derive(Debug, Clone)]
pub struct HeaderSet {
    names: HashSet<String>,
    warnings: Vec<String>,
}

impl HeaderSet {
    /// Validate a header row.
    ///
    /// Unknown columns are tolerated and reported through
    /// [`HeaderSet::warnings`]. A header row that cannot describe any
    /// importable entity fails with `ExchangeError::InvalidHeaders`
    /// carrying every problem found, unknown columns included.
    pub fn parse<I, S>(headers: I) -> Result<Self, ExchangeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = HashSet::new();
        let mut warnings = Vec::new();
        for header in headers {
            let header = header.into();
            if !fields::is_known(&header) && !names.contains(&header) {
                warnings.push(format!("Unknown field \"{header}\" will be ignored"));
            }
            names.insert(header);
        }

        let set = Self { names, warnings };
        let fatal = set.fatal_problems();
        if fatal.is_empty() {
            Ok(set)
        } else {
            let mut problems = set.warnings;
            problems.extend(fatal);
            Err(ExchangeError::InvalidHeaders(problems))
        }
    }

    fn fatal_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.contains(fields::TITLE) && !self.contains(fields::AUTHOR_NAME) {
            problems.push(
                "Unable to load file that contains neither authorName nor title fields".to_string(),
            );
        }

        for (group, label) in [
            (FieldGroup::Author, "author"),
            (FieldGroup::Title, "title"),
            (FieldGroup::Borrower, "borrower"),
        ] {
            if let Some(key) = group.key_field() {
                if self.contains_group(group) && !self.contains(key) {
                    problems.push(format!(
                        "Unable to load file that contains {label} fields without {key}"
                    ));
                }
            }
        }

        problems
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.names.contains(field)
    }

    /// Whether any column of the group is present.
    #[must_use]
    pub fn contains_group(&self, group: FieldGroup) -> bool {
        group.fields().iter().any(|field| self.contains(field))
    }

    /// Non-fatal problems, one message per unknown column.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn can_import_authors(&self) -> bool {
        self.contains(fields::AUTHOR_NAME)
    }

    #[must_use]
    pub fn can_import_titles(&self) -> bool {
        self.contains(fields::TITLE)
    }

    #[must_use]
    pub fn can_import_volumes(&self) -> bool {
        self.contains_group(FieldGroup::Volume)
    }

    #[must_use]
    pub fn can_import_borrowers(&self) -> bool {
        self.contains(fields::BORROWER_NAME)
    }
}
