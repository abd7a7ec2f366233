pub mod listing;
pub mod submission;

pub use listing::ListingController;
pub use submission::{SubmissionController, SubmitError};
