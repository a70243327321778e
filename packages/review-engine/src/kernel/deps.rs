//! Engine dependencies (using traits for testability)
//!
//! `ServerDeps` is the container every domain action receives. The store is a
//! Postgres pool; the notifier sits behind a queue so actions never wait on it.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{Config, NotifierKind};
use crate::kernel::notifications::{LoggingNotifier, NotificationDispatcher, PgNotifier};
use crate::kernel::BaseNotifier;

/// Dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub notifications: NotificationDispatcher,
    /// Deadline applied to each public engine operation
    pub operation_timeout: Duration,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        notifications: NotificationDispatcher,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            db_pool,
            notifications,
            operation_timeout,
        }
    }

    /// Connect to the database and start the notification worker.
    ///
    /// The returned handle finishes once every `ServerDeps` clone is dropped.
    pub async fn from_config(config: &Config) -> Result<(Self, JoinHandle<()>)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.operation_timeout)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;

        let notifier: Arc<dyn BaseNotifier> = match config.notifier {
            NotifierKind::Database => Arc::new(PgNotifier::new(db_pool.clone())),
            NotifierKind::Log => Arc::new(LoggingNotifier),
        };
        let (notifications, worker) =
            NotificationDispatcher::spawn(notifier, config.notification_queue_capacity);

        Ok((
            Self::new(db_pool, notifications, config.operation_timeout),
            worker,
        ))
    }
}
