use tracing::{info, warn};

use crate::common::{EngineResult, ReviewEngineError, ReviewId};
use crate::domains::reviews::{Review, VoteCounts};
use crate::domains::votes::models::Vote;
use crate::kernel::{with_deadline, ServerDeps};

/// Recount a review's live votes and overwrite its cached counters.
///
/// Repairs counters written outside the ledger. The review row is locked
/// first, so casts that commit afterwards apply their deltas on top of the
/// recounted values.
pub async fn reconcile_vote_counts(review_id: ReviewId, deps: &ServerDeps) -> EngineResult<VoteCounts> {
    let (tx, actual) = with_deadline("reconcile_vote_counts", deps.operation_timeout, async {
        let mut tx = deps.db_pool.begin().await?;

        let cached = Review::lock_counts(review_id, &mut tx)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("review", review_id))?;

        let actual = Vote::count_by_type(review_id, &mut tx).await?;

        if cached != actual {
            Review::overwrite_vote_counts(review_id, actual, &mut tx).await?;
            warn!(
                review_id = %review_id,
                cached_helpful = cached.helpful_count,
                cached_not_helpful = cached.not_helpful_count,
                helpful = actual.helpful_count,
                not_helpful = actual.not_helpful_count,
                "Vote counters drifted, corrected"
            );
        } else {
            info!(review_id = %review_id, "Vote counters already consistent");
        }

        Ok((tx, actual))
    })
    .await?;
    tx.commit().await?;

    Ok(actual)
}
