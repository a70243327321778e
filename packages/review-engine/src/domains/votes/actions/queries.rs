use std::collections::HashMap;
use tracing::warn;

use crate::common::{EngineResult, ReviewId, UserId};
use crate::domains::votes::ledger::VoteType;
use crate::domains::votes::models::Vote;
use crate::kernel::{with_deadline, ServerDeps};

/// The caller's votes among `review_ids`.
///
/// Reviews the user has not voted on are absent from the map.
pub async fn list_user_votes(
    user_id: UserId,
    review_ids: &[ReviewId],
    deps: &ServerDeps,
) -> EngineResult<HashMap<ReviewId, VoteType>> {
    if review_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let votes = with_deadline("list_user_votes", deps.operation_timeout, async {
        Ok(Vote::find_for_user(user_id, review_ids, &deps.db_pool).await?)
    })
    .await?;

    let mut by_review = HashMap::with_capacity(votes.len());
    for vote in votes {
        match vote.vote_type() {
            Ok(vote_type) => {
                by_review.insert(vote.review_id, vote_type);
            }
            Err(e) => warn!(vote_id = %vote.id, error = %e, "Skipping unreadable vote"),
        }
    }

    Ok(by_review)
}
