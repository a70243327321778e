//! Cast, switch or retract a helpfulness vote

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::common::{EngineResult, ReviewEngineError, ReviewId, UserId};
use crate::domains::reviews::Review;
use crate::domains::votes::ledger::{plan_vote, VoteAction, VotePlan, VoteType};
use crate::domains::votes::models::Vote;
use crate::kernel::{with_deadline, ServerDeps};

/// How many times one transaction re-reads the caller's vote after losing a
/// first-insert race to a concurrent cast by the same user
const MAX_REPLANS: usize = 3;

/// Result of a cast, with counters as committed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteOutcome {
    pub action: VoteAction,
    pub user_vote: Option<VoteType>,
    pub helpful_count: i32,
    pub not_helpful_count: i32,
}

/// Cast a vote on a review.
///
/// * no vote yet → `created`
/// * same type again → `removed`
/// * other type → `switched`
///
/// The vote row and the review counters change in one transaction.
pub async fn cast_vote(
    review_id: ReviewId,
    user_id: UserId,
    vote_type: &str,
    deps: &ServerDeps,
) -> EngineResult<VoteOutcome> {
    let requested: VoteType = vote_type.parse()?;

    let (tx, outcome) = with_deadline(
        "cast_vote",
        deps.operation_timeout,
        cast_vote_in_tx(review_id, user_id, requested, deps),
    )
    .await?;
    tx.commit().await?;

    info!(
        review_id = %review_id,
        user_id = %user_id,
        action = %outcome.action,
        helpful_count = outcome.helpful_count,
        not_helpful_count = outcome.not_helpful_count,
        "Vote cast"
    );

    Ok(outcome)
}

async fn cast_vote_in_tx(
    review_id: ReviewId,
    user_id: UserId,
    requested: VoteType,
    deps: &ServerDeps,
) -> EngineResult<(Transaction<'static, Postgres>, VoteOutcome)> {
    let mut tx = deps.db_pool.begin().await?;

    if !Review::exists(review_id, &mut *tx).await? {
        return Err(ReviewEngineError::not_found("review", review_id));
    }

    let plan = apply_vote_change(review_id, user_id, requested, &mut tx).await?;

    let counts = Review::apply_vote_delta(
        review_id,
        plan.helpful_delta,
        plan.not_helpful_delta,
        &mut tx,
    )
    .await?;

    Ok((
        tx,
        VoteOutcome {
            action: plan.action,
            user_vote: plan.resulting_vote,
            helpful_count: counts.helpful_count,
            not_helpful_count: counts.not_helpful_count,
        },
    ))
}

/// Bring the caller's vote row to its new state and return the plan that did it
async fn apply_vote_change(
    review_id: ReviewId,
    user_id: UserId,
    requested: VoteType,
    conn: &mut sqlx::PgConnection,
) -> EngineResult<VotePlan> {
    for attempt in 0..MAX_REPLANS {
        if let Some(existing) = Vote::find_for_update(review_id, user_id, conn).await? {
            let current = existing.vote_type()?;
            if current == requested {
                Vote::delete(existing.id, conn).await?;
            } else {
                Vote::update_type(existing.id, requested, conn).await?;
            }
            return Ok(plan_vote(Some(current), requested));
        }

        if Vote::insert_if_absent(review_id, user_id, requested, conn)
            .await?
            .is_some()
        {
            return Ok(plan_vote(None, requested));
        }

        // A concurrent first cast by this user committed between our read and
        // our insert; its row is visible to the next statement.
        debug!(review_id = %review_id, user_id = %user_id, attempt, "Vote insert raced, re-reading");
    }

    Err(ReviewEngineError::ConcurrencyConflict(format!(
        "vote on review {} by user {} kept changing underneath",
        review_id, user_id
    )))
}
