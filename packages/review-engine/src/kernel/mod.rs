//! Kernel module - engine infrastructure and dependencies.

pub mod deadline;
pub mod deps;
pub mod notifications;
pub mod test_dependencies;
pub mod traits;

pub use deadline::with_deadline;
pub use deps::ServerDeps;
pub use notifications::{LoggingNotifier, NotificationDispatcher, PgNotifier};
pub use test_dependencies::{FailingNotifier, SpyNotifier};
pub use traits::*;
