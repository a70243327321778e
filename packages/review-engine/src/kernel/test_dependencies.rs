// Test doubles for the notifier
//
// Injected into ServerDeps by unit and integration tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseNotifier, Notification, NotificationDispatcher};

// =============================================================================
// Spy Notifier
// =============================================================================

/// Records every notification it is asked to deliver
pub struct SpyNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl SpyNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Everything delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Poll until at least `count` notifications arrived or `timeout` passed.
    ///
    /// Delivery runs on the dispatcher worker, so tests wait instead of
    /// asserting immediately after the action returns.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Spy plus a running dispatcher wired to it
    pub fn dispatcher() -> (Arc<Self>, NotificationDispatcher) {
        let spy = Arc::new(Self::new());
        let (dispatcher, _worker) = NotificationDispatcher::spawn(spy.clone(), 64);
        (spy, dispatcher)
    }
}

impl Default for SpyNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for SpyNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).push(notification.clone());
        Ok(())
    }
}

// =============================================================================
// Failing Notifier
// =============================================================================

/// Always fails; counts how often it was tried
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn new() -> Self {
        Self {
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for FailingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("notification backend unavailable"))
    }
}
