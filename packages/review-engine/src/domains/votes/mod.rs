//! Votes domain - the helpfulness vote ledger
//!
//! Owns the "one vote per (user, review)" invariant and is the only writer of
//! a review's `helpful_count` / `not_helpful_count`.

pub mod actions;
pub mod ledger;
pub mod models;

pub use actions::{cast_vote, list_user_votes, reconcile_vote_counts, VoteOutcome};
pub use ledger::{VoteAction, VoteType};
pub use models::Vote;
