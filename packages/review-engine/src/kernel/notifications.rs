//! Fire-and-forget notification delivery.
//!
//! Domain actions call [`NotificationDispatcher::dispatch`] after their
//! transaction commits. Dispatch never awaits and never fails the caller: the
//! message goes onto a bounded channel drained by one background worker that
//! owns the actual [`BaseNotifier`]. A full or closed queue drops the message
//! with a warning.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::traits::{BaseNotifier, Notification};
use crate::domains::notifications::models::StoredNotification;

/// Cloneable handle onto the notification queue
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Start the delivery worker. Must be called inside a tokio runtime.
    ///
    /// The worker exits once every dispatcher clone has been dropped and the
    /// queue is drained.
    pub fn spawn(notifier: Arc<dyn BaseNotifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if let Err(e) = notifier.notify(&notification).await {
                    error!(
                        user_id = %notification.user_id,
                        kind = %notification.kind,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Queue a notification. Returns false when it had to be dropped.
    pub fn dispatch(&self, notification: Notification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(n)) => {
                warn!(user_id = %n.user_id, kind = %n.kind, "Notification queue full, dropping");
                false
            }
            Err(mpsc::error::TrySendError::Closed(n)) => {
                warn!(user_id = %n.user_id, kind = %n.kind, "Notification worker stopped, dropping");
                false
            }
        }
    }
}

// =============================================================================
// Notifier implementations
// =============================================================================

/// Writes notifications into the in-app inbox table
pub struct PgNotifier {
    pool: PgPool,
}

impl PgNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseNotifier for PgNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        StoredNotification::insert(notification, &self.pool).await?;
        Ok(())
    }
}

/// Only records the notification in the log
pub struct LoggingNotifier;

#[async_trait]
impl BaseNotifier for LoggingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            title = %notification.title,
            "Notification"
        );
        Ok(())
    }
}
