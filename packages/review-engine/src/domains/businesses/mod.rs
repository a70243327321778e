//! Businesses domain - listings and their aggregate ratings
//!
//! The aggregation engine is the only writer of `aggregate_rating` and
//! `micro_metrics_aggregates`.

pub mod actions;
pub mod aggregation;
pub mod models;

pub use actions::{recompute_business_aggregates, refresh_business_aggregates};
pub use aggregation::BusinessAggregates;
pub use models::{Business, BusinessClaimStatus};
