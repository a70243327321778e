// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::UserId;

// =============================================================================
// Notification payload
// =============================================================================

/// What happened, from the recipient's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ClaimApproved,
    ClaimRejected,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::ClaimApproved => write!(f, "claim_approved"),
            NotificationKind::ClaimRejected => write!(f, "claim_rejected"),
        }
    }
}

/// A user-facing message handed to the notifier after a state change commits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: serde_json::Value,
}

// =============================================================================
// Notifier Trait (Infrastructure)
// =============================================================================

/// Delivers a notification (in-app inbox, push, email...).
///
/// Implementations may fail; the dispatcher logs and drops failures so they
/// never reach the operation that produced the notification.
#[async_trait]
pub trait BaseNotifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}
