// Review Engine - rating/vote consistency and claim resolution core
//
// Keeps review helpfulness counters consistent with the vote ledger, keeps a
// business's aggregate ratings in step with its visible reviews, and resolves
// competing ownership claims. HTTP handlers sit outside this crate and call
// the domain actions with a `ServerDeps`.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
