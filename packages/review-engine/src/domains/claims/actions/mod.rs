//! Claims domain actions

mod resolve;
mod submit;

pub use resolve::{resolve_claim, ClaimResolution};
pub use submit::submit_claim;
