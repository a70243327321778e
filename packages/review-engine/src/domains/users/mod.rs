//! Users domain - only the role matters to the engine (claim approval promotes it)

pub mod models;

pub use models::{User, UserRole};
