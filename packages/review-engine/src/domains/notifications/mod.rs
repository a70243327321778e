//! Notifications domain - in-app inbox written by the database notifier

pub mod models;

pub use models::StoredNotification;
