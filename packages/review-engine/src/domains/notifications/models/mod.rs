pub mod notification;

pub use notification::StoredNotification;
