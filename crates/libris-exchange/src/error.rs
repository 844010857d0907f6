//! Error types for import and export.

use thiserror::Error;

use crate::outcome::Outcome;

/// Errors that stop an import or export before or while it touches a file.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Quoting that RFC 4180 does not allow. `line` is 1-based.
    #[error("malformed CSV at line {line}: {problem}")]
    MalformedCsv { line: usize, problem: &'static str },

    /// The header row cannot describe any importable entity.
    #[error("invalid headers: {}", .0.join("; "))]
    InvalidHeaders(Vec<String>),

    #[error("storage error: {0}")]
    Storage(#[from] libris_core::Error),
}

impl ExchangeError {
    /// Render the error as outcomes for display, one per problem.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<Outcome> {
        match self {
            Self::InvalidHeaders(problems) => problems.into_iter().map(Outcome::error).collect(),
            other => vec![Outcome::error(other.to_string())],
        }
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Status;

    #[test]
    fn test_invalid_headers_outcomes() {
        let error = ExchangeError::InvalidHeaders(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(error.to_string(), "invalid headers: one; two");

        let outcomes = error.into_outcomes();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.status == Status::Error));
        assert_eq!(outcomes[1].message, "two");
    }

    #[test]
    fn test_malformed_csv_outcome_names_the_line() {
        let error = ExchangeError::MalformedCsv {
            line: 2,
            problem: "unterminated quoted field",
        };
        assert_eq!(
            error.into_outcomes(),
            vec![Outcome::error("malformed CSV at line 2: unterminated quoted field")]
        );
    }

    #[test]
    fn test_io_error_is_single_outcome() {
        let error = ExchangeError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.csv",
        ));
        let outcomes = error.into_outcomes();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].message.contains("missing.csv"));
    }
}
