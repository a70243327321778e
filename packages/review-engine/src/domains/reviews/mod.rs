//! Reviews domain - review creation and moderation
//!
//! Every change to the visible review population triggers a synchronous
//! aggregate recompute for the review's business.

pub mod actions;
pub mod models;

pub use actions::{create_review, set_review_deleted, set_review_hidden};
pub use models::{NewReview, Review, VoteCounts};
