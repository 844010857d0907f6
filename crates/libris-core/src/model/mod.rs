pub mod author;
pub mod borrower;
pub mod ids;
pub mod name;
pub mod title;
pub mod volume;

pub use author::Author;
pub use borrower::Borrower;
pub use ids::{AuthorId, BorrowerId, TitleId, VolumeId};
pub use name::PersonName;
pub use title::Title;
pub use volume::Volume;
