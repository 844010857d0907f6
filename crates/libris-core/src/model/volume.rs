use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{BorrowerId, TitleId, VolumeId};

/// A physical copy of a title.
///
/// Every volume belongs to exactly one title, fixed at creation. The
/// borrower link is a shared reference and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: VolumeId,
    pub title_id: TitleId,
    pub borrower_id: Option<BorrowerId>,

    pub binding: String,
    pub publisher: String,
    pub publication_date: String,
    pub isbn: String,
    pub library_of_congress: String,
    pub asin: String,
    pub note: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volume {
    #[must_use]
    pub fn new(title_id: TitleId) -> Self {
        let now = Utc::now();
        Self {
            id: VolumeId::new(),
            title_id,
            borrower_id: None,
            binding: String::new(),
            publisher: String::new(),
            publication_date: String::new(),
            isbn: String::new(),
            library_of_congress: String::new(),
            asin: String::new(),
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The non-empty parts of `binding publisher publicationDate`, as shown
    /// after a title.
    #[must_use]
    pub fn details(&self) -> String {
        [&self.binding, &self.publisher, &self.publication_date]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the volume is currently checked out.
    #[must_use]
    pub const fn is_checked_out(&self) -> bool {
        self.borrower_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_new() {
        let title = TitleId::new();
        let volume = Volume::new(title);
        assert_eq!(volume.title_id, title);
        assert!(!volume.is_checked_out());
    }

    #[test]
    fn test_volume_details() {
        let mut volume = Volume::new(TitleId::new());
        volume.binding = "Hardcover".to_string();
        volume.publisher = "Harper".to_string();
        volume.publication_date = "1851".to_string();
        assert_eq!(volume.details(), "Hardcover Harper 1851");
    }

    #[test]
    fn test_volume_details_skips_blank_parts() {
        let mut volume = Volume::new(TitleId::new());
        volume.binding = "Hard".to_string();
        volume.publication_date = "1851".to_string();
        assert_eq!(volume.details(), "Hard 1851");
        assert_eq!(Volume::new(TitleId::new()).details(), "");
    }

    #[test]
    fn test_volume_checked_out() {
        let mut volume = Volume::new(TitleId::new());
        volume.borrower_id = Some(BorrowerId::new());
        assert!(volume.is_checked_out());
    }
}
