use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

use crate::common::{BusinessId, ClaimId, ReviewEngineError, UserId};
use crate::domains::claims::machines::ClaimStatus;

/// Claim - a user's request to be recognized as a business's owner
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Claim {
    pub id: ClaimId,
    pub business_id: BusinessId,
    pub claimant_id: UserId,
    pub status: String, // 'pending', 'approved', 'rejected'
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    pub fn status(&self) -> Result<ClaimStatus, ReviewEngineError> {
        self.status.parse().map_err(|_| {
            ReviewEngineError::StoreUnavailable(format!(
                "claim {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Claim {
    pub async fn find_by_id<'e>(id: ClaimId, executor: impl PgExecutor<'e>) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM business_claims WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn lock(id: ClaimId, conn: &mut PgConnection) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM business_claims WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn create(
        business_id: BusinessId,
        claimant_id: UserId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO business_claims (id, business_id, claimant_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(ClaimId::new())
        .bind(business_id)
        .bind(claimant_id)
        .fetch_one(conn)
        .await
    }

    /// Move a pending claim to a terminal status
    pub async fn resolve(
        id: ClaimId,
        status: ClaimStatus,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE business_claims
            SET
                status = $2,
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_one(conn)
        .await
    }

    /// Reject every other pending claim on the business in one statement
    pub async fn reject_other_pending(
        business_id: BusinessId,
        except: ClaimId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<ClaimId>> {
        sqlx::query_scalar::<_, ClaimId>(
            r#"
            UPDATE business_claims
            SET
                status = 'rejected',
                resolved_at = NOW(),
                updated_at = NOW()
            WHERE business_id = $1
              AND id <> $2
              AND status = 'pending'
            RETURNING id
            "#,
        )
        .bind(business_id)
        .bind(except)
        .fetch_all(conn)
        .await
    }

    pub async fn count_other_pending(
        business_id: BusinessId,
        except: ClaimId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM business_claims
            WHERE business_id = $1 AND id <> $2 AND status = 'pending'
            "#,
        )
        .bind(business_id)
        .bind(except)
        .fetch_one(conn)
        .await
    }

    pub async fn has_pending_for_claimant(
        business_id: BusinessId,
        claimant_id: UserId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM business_claims
                WHERE business_id = $1 AND claimant_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(business_id)
        .bind(claimant_id)
        .fetch_one(conn)
        .await
    }
}
