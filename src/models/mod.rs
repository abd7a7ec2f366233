pub mod draft;
pub mod user;

pub use draft::{DraftError, FieldErrors, FieldName, ProfileImage, UserDraft};
pub use user::User;
