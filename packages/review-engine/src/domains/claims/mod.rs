//! Claims domain - business ownership claims
//!
//! The claim resolver is the only writer of a business's `claim_status` and
//! `owner_id`, and of the owner role promotion that follows an approval.

pub mod actions;
pub mod machines;
pub mod models;

pub use actions::{resolve_claim, submit_claim, ClaimResolution};
pub use machines::{ClaimDecision, ClaimStatus};
pub use models::Claim;
