pub mod business;

pub use business::{Business, BusinessClaimStatus};
