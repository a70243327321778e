//! Recompute a business's aggregate rating and micro-metric averages

use sqlx::{Postgres, Transaction};
use tracing::{error, info, warn};

use crate::common::{BusinessId, EngineResult, ReviewEngineError};
use crate::domains::businesses::aggregation::{BusinessAggregates, RatingAccumulator};
use crate::domains::businesses::models::Business;
use crate::domains::reviews::models::Review;
use crate::kernel::{with_deadline, ServerDeps};

/// Rebuild `aggregate_rating` and `micro_metrics_aggregates` from the
/// business's current non-hidden, non-deleted reviews.
///
/// Idempotent and not additive: the result depends only on the reviews
/// visible at the time of the call.
pub async fn recompute_business_aggregates(
    business_id: BusinessId,
    deps: &ServerDeps,
) -> EngineResult<BusinessAggregates> {
    let (tx, aggregates) = with_deadline(
        "recompute_business_aggregates",
        deps.operation_timeout,
        recompute_in_tx(business_id, deps),
    )
    .await?;
    tx.commit().await?;

    info!(
        business_id = %business_id,
        review_count = aggregates.review_count,
        aggregate_rating = aggregates.aggregate_rating,
        "Business aggregates recomputed"
    );

    Ok(aggregates)
}

async fn recompute_in_tx(
    business_id: BusinessId,
    deps: &ServerDeps,
) -> EngineResult<(Transaction<'static, Postgres>, BusinessAggregates)> {
    let mut tx = deps.db_pool.begin().await?;

    // Concurrent recomputes for one business serialize on this lock, so the
    // last writer always saw the latest review population.
    Business::lock(business_id, &mut tx)
        .await?
        .ok_or_else(|| ReviewEngineError::not_found("business", business_id))?;

    let rows = Review::find_visible_ratings(business_id, &mut tx).await?;

    let mut accumulator = RatingAccumulator::new();
    for row in &rows {
        accumulator.add(row.overall_rating, &row.micro_ratings.0);
    }
    let aggregates = accumulator.finish();

    Business::update_aggregates(
        business_id,
        aggregates.aggregate_rating,
        &aggregates.micro_metrics_aggregates,
        &mut tx,
    )
    .await?;

    Ok((tx, aggregates))
}

/// Side-effect entry point used after review mutations.
///
/// The triggering operation has already committed, so failures here are
/// logged rather than returned.
pub async fn refresh_business_aggregates(business_id: BusinessId, deps: &ServerDeps) {
    match recompute_business_aggregates(business_id, deps).await {
        Ok(_) => {}
        Err(ReviewEngineError::NotFound(_)) => {
            warn!(business_id = %business_id, "Skipping aggregate refresh: business not found");
        }
        Err(e) => {
            error!(business_id = %business_id, error = %e, "Failed to refresh business aggregates");
        }
    }
}
