use tracing::info;

use crate::common::{BusinessId, EngineResult, ReviewEngineError, UserId};
use crate::domains::businesses::{Business, BusinessClaimStatus};
use crate::domains::claims::models::Claim;
use crate::domains::users::User;
use crate::kernel::{with_deadline, ServerDeps};

/// File a pending ownership claim.
///
/// An unclaimed business moves to `pending`. Approved businesses take no new
/// claims, and a claimant may hold only one pending claim per business.
pub async fn submit_claim(
    business_id: BusinessId,
    claimant_id: UserId,
    deps: &ServerDeps,
) -> EngineResult<Claim> {
    let (tx, claim) = with_deadline("submit_claim", deps.operation_timeout, async {
        let mut tx = deps.db_pool.begin().await?;

        let business = Business::lock(business_id, &mut tx)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("business", business_id))?;

        if business.claim_status().ok() == Some(BusinessClaimStatus::Approved) {
            return Err(ReviewEngineError::InvalidState(format!(
                "business {} already has an owner",
                business_id
            )));
        }

        User::find_by_id(claimant_id, &mut *tx)
            .await?
            .ok_or_else(|| ReviewEngineError::not_found("user", claimant_id))?;

        if Claim::has_pending_for_claimant(business_id, claimant_id, &mut tx).await? {
            return Err(ReviewEngineError::InvalidState(format!(
                "user {} already has a pending claim on business {}",
                claimant_id, business_id
            )));
        }

        let claim = Claim::create(business_id, claimant_id, &mut tx).await?;
        Business::mark_claim_pending(business_id, &mut tx).await?;

        Ok((tx, claim))
    })
    .await?;
    tx.commit().await?;

    info!(claim_id = %claim.id, business_id = %business_id, claimant_id = %claimant_id, "Claim submitted");
    Ok(claim)
}
