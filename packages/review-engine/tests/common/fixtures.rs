//! Test fixtures for creating test data.
//!
//! Users and businesses are created through the model methods directly;
//! reviews go through `create_review` so aggregates stay in step.

use anyhow::Result;
use review_engine::common::{BusinessId, ReviewId, UserId};
use review_engine::domains::businesses::Business;
use review_engine::domains::reviews::{create_review, NewReview};
use review_engine::domains::users::{User, UserRole};
use review_engine::kernel::ServerDeps;
use sqlx::PgPool;
use std::collections::BTreeMap;

pub async fn create_test_user(pool: &PgPool, role: UserRole) -> Result<UserId> {
    let user = User::create("Test User", role, pool).await?;
    Ok(user.id)
}

pub async fn create_test_business(pool: &PgPool) -> Result<BusinessId> {
    let business = Business::create("Test Business", pool).await?;
    Ok(business.id)
}

/// Review with only an overall rating
pub async fn create_test_review(
    deps: &ServerDeps,
    business_id: BusinessId,
    overall_rating: f64,
) -> Result<ReviewId> {
    create_test_review_with_metrics(deps, business_id, overall_rating, &[]).await
}

/// Review with micro-ratings, written by a fresh user
pub async fn create_test_review_with_metrics(
    deps: &ServerDeps,
    business_id: BusinessId,
    overall_rating: f64,
    metrics: &[(&str, f64)],
) -> Result<ReviewId> {
    let author_id = create_test_user(&deps.db_pool, UserRole::User).await?;
    let micro_ratings: BTreeMap<String, f64> = metrics
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect();

    let review = create_review(
        NewReview::builder()
            .author_id(author_id)
            .business_id(business_id)
            .body("Solid spot, would come back")
            .overall_rating(overall_rating)
            .micro_ratings(micro_ratings)
            .build(),
        deps,
    )
    .await?;

    Ok(review.id)
}
