// Business domains
pub mod businesses;
pub mod claims;
pub mod notifications;
pub mod reviews;
pub mod users;
pub mod votes;
