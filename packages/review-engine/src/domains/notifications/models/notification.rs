use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{NotificationId, UserId};
use crate::kernel::Notification;

/// A notification persisted to a user's in-app inbox
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredNotification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: Json<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredNotification {
    pub async fn insert(notification: &Notification, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(notification.user_id)
        .bind(notification.kind.to_string())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(Json(&notification.metadata))
        .fetch_one(pool)
        .await
    }

    /// Unread inbox for a user, newest first
    pub async fn find_unread_for_user(user_id: UserId, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications WHERE user_id = $1 AND is_read = false ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_read(id: NotificationId, user_id: UserId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
