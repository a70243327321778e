//! Businesses domain actions

mod recompute;

pub use recompute::{recompute_business_aggregates, refresh_business_aggregates};
