use serde::{Deserialize, Serialize};
use std::fmt;

/// A person's name split into the two parts authors and borrowers are
/// matched on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub last: String,
    pub first: String,
}

impl PersonName {
    #[must_use]
    pub fn new(last: impl Into<String>, first: impl Into<String>) -> Self {
        Self {
            last: last.into(),
            first: first.into(),
        }
    }

    /// Split `"Last, First"` on the first comma.
    ///
    /// Both parts are trimmed. Without a comma the whole text is the last
    /// name and the first name is empty.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.split_once(',') {
            Some((last, first)) => Self::new(last.trim(), first.trim()),
            None => Self::new(text.trim(), ""),
        }
    }

    /// Display form used in exports and messages.
    #[must_use]
    pub fn display(last: &str, first: &str) -> String {
        match (last.is_empty(), first.is_empty()) {
            (false, false) => format!("{last}, {first}"),
            (false, true) => last.to_string(),
            (true, false) => first.to_string(),
            (true, true) => String::from("<<<no name>>>"),
        }
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::display(&self.last, &self.first))
    }
}
