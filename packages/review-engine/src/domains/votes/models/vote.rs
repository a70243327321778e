use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ReviewEngineError, ReviewId, UserId, VoteId};
use crate::domains::reviews::VoteCounts;
use crate::domains::votes::ledger::VoteType;

/// Vote - one user's helpfulness vote on one review
///
/// Unique per (review_id, user_id). Owned exclusively by the vote ledger.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub id: VoteId,
    pub review_id: ReviewId,
    pub user_id: UserId,
    pub vote_type: String, // 'helpful', 'not_helpful'
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    /// Stored type. The column is CHECK-constrained, so a parse failure means
    /// the store handed back something it should not have.
    pub fn vote_type(&self) -> Result<VoteType, ReviewEngineError> {
        self.vote_type.parse().map_err(|_| {
            ReviewEngineError::StoreUnavailable(format!(
                "vote {} has unknown type '{}'",
                self.id, self.vote_type
            ))
        })
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Vote {
    /// Read and lock the caller's vote for the rest of the transaction
    pub async fn find_for_update(
        review_id: ReviewId,
        user_id: UserId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM review_votes WHERE review_id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
    }

    /// Insert the caller's first vote.
    ///
    /// Returns None when a concurrent transaction already holds the
    /// (review, user) slot; the unique key makes this wait for that
    /// transaction to finish first.
    pub async fn insert_if_absent(
        review_id: ReviewId,
        user_id: UserId,
        vote_type: VoteType,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO review_votes (id, review_id, user_id, vote_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (review_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(VoteId::new())
        .bind(review_id)
        .bind(user_id)
        .bind(vote_type.as_str())
        .fetch_optional(conn)
        .await
    }

    pub async fn update_type(
        id: VoteId,
        vote_type: VoteType,
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE review_votes SET vote_type = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(vote_type.as_str())
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete(id: VoteId, conn: &mut PgConnection) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM review_votes WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// The user's votes among `review_ids`
    pub async fn find_for_user(
        user_id: UserId,
        review_ids: &[ReviewId],
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM review_votes WHERE user_id = $1 AND review_id = ANY($2)",
        )
        .bind(user_id)
        .bind(review_ids)
        .fetch_all(pool)
        .await
    }

    /// Brute-force count of live votes by type
    pub async fn count_by_type(review_id: ReviewId, conn: &mut PgConnection) -> sqlx::Result<VoteCounts> {
        sqlx::query_as::<_, VoteCounts>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE vote_type = 'helpful')::INT AS helpful_count,
                COUNT(*) FILTER (WHERE vote_type = 'not_helpful')::INT AS not_helpful_count
            FROM review_votes
            WHERE review_id = $1
            "#,
        )
        .bind(review_id)
        .fetch_one(conn)
        .await
    }
}
