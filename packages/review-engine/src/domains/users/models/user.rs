use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::common::UserId;

/// User - a reviewer, claimant or business owner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub role: String, // 'user', 'owner', 'moderator', 'admin'
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User role, ordered by privilege (`User < Owner < Moderator < Admin`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Owner,
    Moderator,
    Admin,
}

impl UserRole {
    /// Role after promoting to `target`. Never lowers privilege.
    pub fn promoted_to(self, target: UserRole) -> UserRole {
        self.max(target)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "user"),
            UserRole::Owner => write!(f, "owner"),
            UserRole::Moderator => write!(f, "moderator"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "user" => Ok(UserRole::User),
            "owner" => Ok(UserRole::Owner),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl User {
    pub async fn find_by_id<'e>(id: UserId, executor: impl PgExecutor<'e>) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn create(display_name: &str, role: UserRole, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, display_name, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(UserId::new())
        .bind(display_name)
        .bind(role.to_string())
        .fetch_one(pool)
        .await
    }

    /// Lock the user row and read its role
    pub async fn lock_role(id: UserId, conn: &mut PgConnection) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn set_role(id: UserId, role: UserRole, conn: &mut PgConnection) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role.to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    pub fn role(&self) -> anyhow::Result<UserRole> {
        self.role.parse()
    }
}
