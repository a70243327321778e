//! Reviews domain actions

mod moderation;

pub use moderation::{create_review, set_review_deleted, set_review_hidden};
