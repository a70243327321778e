//! Votes domain actions

mod cast_vote;
mod queries;
mod reconcile;

pub use cast_vote::{cast_vote, VoteOutcome};
pub use queries::list_user_votes;
pub use reconcile::reconcile_vote_counts;
