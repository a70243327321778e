//! Review creation and visibility changes.
//!
//! Each action commits its own change and then recomputes the business
//! aggregates before returning, so a read right after a moderation action
//! never sees a stale rating.

use tracing::info;

use crate::common::{EngineResult, ReviewEngineError, ReviewId};
use crate::domains::businesses::{refresh_business_aggregates, Business};
use crate::domains::reviews::models::{NewReview, Review};
use crate::domains::users::User;
use crate::kernel::{with_deadline, ServerDeps};

const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

fn check_rating(label: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(ReviewEngineError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            label, MIN_RATING, MAX_RATING, value
        )))
    }
}

pub(crate) fn validate_new_review(new: &NewReview) -> EngineResult<()> {
    check_rating("overall_rating", new.overall_rating)?;
    for (metric, score) in &new.micro_ratings {
        if metric.trim().is_empty() {
            return Err(ReviewEngineError::InvalidInput(
                "micro rating names must not be empty".to_string(),
            ));
        }
        check_rating(metric, *score)?;
    }
    Ok(())
}

/// Create a review and fold it into the business aggregates
pub async fn create_review(new: NewReview, deps: &ServerDeps) -> EngineResult<Review> {
    validate_new_review(&new)?;

    let (tx, review) = with_deadline("create_review", deps.operation_timeout, async {
        let mut tx = deps.db_pool.begin().await?;

        Business::find_by_id(new.business_id, &mut *tx)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("business", new.business_id))?;
        User::find_by_id(new.author_id, &mut *tx)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("user", new.author_id))?;

        let review = Review::insert(&new, &mut *tx).await?;
        Ok((tx, review))
    })
    .await?;
    tx.commit().await?;

    info!(review_id = %review.id, business_id = %review.business_id, "Review created");

    refresh_business_aggregates(review.business_id, deps).await;
    Ok(review)
}

/// Hide or unhide a review (moderation)
pub async fn set_review_hidden(
    review_id: ReviewId,
    hidden: bool,
    deps: &ServerDeps,
) -> EngineResult<Review> {
    let review = with_deadline("set_review_hidden", deps.operation_timeout, async {
        Review::set_hidden(review_id, hidden, &deps.db_pool)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("review", review_id))
    })
    .await?;

    info!(review_id = %review_id, hidden, "Review visibility changed");

    refresh_business_aggregates(review.business_id, deps).await;
    Ok(review)
}

/// Soft delete or restore a review
pub async fn set_review_deleted(
    review_id: ReviewId,
    deleted: bool,
    deps: &ServerDeps,
) -> EngineResult<Review> {
    let review = with_deadline("set_review_deleted", deps.operation_timeout, async {
        Review::set_deleted(review_id, deleted, &deps.db_pool)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("review", review_id))
    })
    .await?;

    info!(review_id = %review_id, deleted, "Review deletion flag changed");

    refresh_business_aggregates(review.business_id, deps).await;
    Ok(review)
}
