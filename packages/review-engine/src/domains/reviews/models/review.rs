use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;

use crate::common::{BusinessId, ReviewId, UserId};

/// Review - a user's rating of a business
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub author_id: UserId,
    pub business_id: BusinessId,
    pub body: String,
    pub overall_rating: f64,
    pub micro_ratings: Json<BTreeMap<String, serde_json::Value>>,

    // Denormalized cache over review_votes, written only by the vote ledger
    pub helpful_count: i32,
    pub not_helpful_count: i32,

    // Moderation
    pub is_hidden: bool,
    pub is_deleted: bool,
    pub owner_reply: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewReview {
    pub author_id: UserId,
    pub business_id: BusinessId,
    #[builder(setter(into))]
    pub body: String,
    pub overall_rating: f64,
    #[builder(default)]
    pub micro_ratings: BTreeMap<String, f64>,
}

/// The slice of a review the aggregation engine reads
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingRow {
    pub overall_rating: f64,
    pub micro_ratings: Json<BTreeMap<String, serde_json::Value>>,
}

/// Post-update helpfulness counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoteCounts {
    pub helpful_count: i32,
    pub not_helpful_count: i32,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Review {
    pub async fn find_by_id<'e>(
        id: ReviewId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn exists<'e>(id: ReviewId, executor: impl PgExecutor<'e>) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM reviews WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    pub async fn insert<'e>(new: &NewReview, executor: impl PgExecutor<'e>) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO reviews (id, author_id, business_id, body, overall_rating, micro_ratings)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(ReviewId::new())
        .bind(new.author_id)
        .bind(new.business_id)
        .bind(&new.body)
        .bind(new.overall_rating)
        .bind(Json(&new.micro_ratings))
        .fetch_one(executor)
        .await
    }

    /// Hide or unhide. Returns None if the review does not exist.
    pub async fn set_hidden(id: ReviewId, hidden: bool, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE reviews SET is_hidden = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(hidden)
        .fetch_optional(pool)
        .await
    }

    /// Soft delete or restore. Returns None if the review does not exist.
    pub async fn set_deleted(id: ReviewId, deleted: bool, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE reviews SET is_deleted = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(deleted)
        .fetch_optional(pool)
        .await
    }

    /// Ratings of every review that counts toward the business aggregates
    pub async fn find_visible_ratings(
        business_id: BusinessId,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<RatingRow>> {
        sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT overall_rating, micro_ratings
            FROM reviews
            WHERE business_id = $1
              AND is_hidden = false
              AND is_deleted = false
            "#,
        )
        .bind(business_id)
        .fetch_all(conn)
        .await
    }

    /// Apply counter deltas atomically in the database, flooring at zero
    pub async fn apply_vote_delta(
        id: ReviewId,
        helpful_delta: i32,
        not_helpful_delta: i32,
        conn: &mut PgConnection,
    ) -> sqlx::Result<VoteCounts> {
        sqlx::query_as::<_, VoteCounts>(
            r#"
            UPDATE reviews
            SET
                helpful_count = GREATEST(helpful_count + $2, 0),
                not_helpful_count = GREATEST(not_helpful_count + $3, 0),
                updated_at = NOW()
            WHERE id = $1
            RETURNING helpful_count, not_helpful_count
            "#,
        )
        .bind(id)
        .bind(helpful_delta)
        .bind(not_helpful_delta)
        .fetch_one(conn)
        .await
    }

    /// Lock the review row (used by counter reconciliation)
    pub async fn lock_counts(id: ReviewId, conn: &mut PgConnection) -> sqlx::Result<Option<VoteCounts>> {
        sqlx::query_as::<_, VoteCounts>(
            "SELECT helpful_count, not_helpful_count FROM reviews WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn overwrite_vote_counts(
        id: ReviewId,
        counts: VoteCounts,
        conn: &mut PgConnection,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            UPDATE reviews
            SET helpful_count = $2, not_helpful_count = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(counts.helpful_count)
        .bind(counts.not_helpful_count)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn find_all_ids(pool: &PgPool) -> sqlx::Result<Vec<ReviewId>> {
        sqlx::query_scalar::<_, ReviewId>("SELECT id FROM reviews ORDER BY created_at")
            .fetch_all(pool)
            .await
    }
}
