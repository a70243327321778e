//! Approve or reject an ownership claim

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::info;

use crate::common::{BusinessId, ClaimId, EngineResult, ReviewEngineError, UserId};
use crate::domains::businesses::{Business, BusinessClaimStatus};
use crate::domains::claims::machines::{ClaimDecision, ClaimStatus};
use crate::domains::claims::models::Claim;
use crate::domains::users::{User, UserRole};
use crate::kernel::{with_deadline, Notification, NotificationKind, ServerDeps};

/// Committed outcome of a claim decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimResolution {
    pub claim_id: ClaimId,
    pub business_id: BusinessId,
    pub claimant_id: UserId,
    pub status: ClaimStatus,
    pub business_claim_status: BusinessClaimStatus,
    /// Rival pending claims rejected by an approval
    pub rejected_rivals: Vec<ClaimId>,
}

/// Resolve a pending claim.
///
/// Approve: the claim is approved, the claimant becomes the business owner
/// (role promoted to owner unless already higher) and every other pending
/// claim on the business is rejected.
///
/// Reject: the claim is rejected and the business falls back to `unclaimed`
/// once no pending claim remains.
///
/// All database changes commit together; the claimant is notified after the
/// commit. A claim that is already approved or rejected yields `InvalidState`.
pub async fn resolve_claim(
    claim_id: ClaimId,
    decision: &str,
    deps: &ServerDeps,
) -> EngineResult<ClaimResolution> {
    let decision: ClaimDecision = decision.parse()?;

    let (tx, resolution, business_name) = with_deadline(
        "resolve_claim",
        deps.operation_timeout,
        resolve_in_tx(claim_id, decision, deps),
    )
    .await?;
    tx.commit().await?;

    info!(
        claim_id = %claim_id,
        business_id = %resolution.business_id,
        status = %resolution.status,
        business_claim_status = %resolution.business_claim_status,
        rejected_rivals = resolution.rejected_rivals.len(),
        "Claim resolved"
    );

    deps.notifications
        .dispatch(claimant_notification(&resolution, &business_name));

    Ok(resolution)
}

async fn resolve_in_tx(
    claim_id: ClaimId,
    decision: ClaimDecision,
    deps: &ServerDeps,
) -> EngineResult<(Transaction<'static, Postgres>, ClaimResolution, String)> {
    let mut tx = deps.db_pool.begin().await?;

    let claim = Claim::find_by_id(claim_id, &mut *tx)
        .await?
        .ok_or_else(|| ReviewEngineError::not_found("claim", claim_id))?;

    // Lock the business before the claim: every resolver for this business
    // queues here, so sibling approvals can't interleave.
    let business = Business::lock(claim.business_id, &mut tx)
        .await?
        .ok_or_else(|| ReviewEngineError::not_found("business", claim.business_id))?;

    let claim = Claim::lock(claim_id, &mut tx)
        .await?
        .ok_or_else(|| ReviewEngineError::not_found("claim", claim_id))?;

    let status = claim.status()?.apply(decision)?;
    Claim::resolve(claim.id, status, &mut tx).await?;

    let (business_claim_status, rejected_rivals) = match decision {
        ClaimDecision::Approve => {
            if !Business::assign_owner(business.id, claim.claimant_id, &mut tx).await? {
                return Err(ReviewEngineError::ConcurrencyConflict(format!(
                    "business {} already has an approved claim",
                    business.id
                )));
            }
            promote_to_owner(claim.claimant_id, &mut tx).await?;
            let rivals = Claim::reject_other_pending(business.id, claim.id, &mut tx).await?;
            (BusinessClaimStatus::Approved, rivals)
        }
        ClaimDecision::Reject => {
            let remaining = Claim::count_other_pending(business.id, claim.id, &mut tx).await?;
            let reset = remaining == 0
                && Business::reset_pending_to_unclaimed(business.id, &mut tx).await?;
            let projected = if reset {
                BusinessClaimStatus::Unclaimed
            } else {
                business.claim_status().map_err(|e| {
                    ReviewEngineError::StoreUnavailable(e.to_string())
                })?
            };
            (projected, Vec::new())
        }
    };

    Ok((
        tx,
        ClaimResolution {
            claim_id: claim.id,
            business_id: business.id,
            claimant_id: claim.claimant_id,
            status,
            business_claim_status,
            rejected_rivals,
        },
        business.name,
    ))
}

/// Raise the claimant to owner; moderators and admins keep their role
async fn promote_to_owner(user_id: UserId, conn: &mut PgConnection) -> EngineResult<UserRole> {
    let current = User::lock_role(user_id, conn)
        .await?
        .ok_or_else(|| ReviewEngineError::not_found("user", user_id))?
        .parse::<UserRole>()
        .map_err(|e| ReviewEngineError::StoreUnavailable(e.to_string()))?;

    let promoted = current.promoted_to(UserRole::Owner);
    if promoted != current {
        User::set_role(user_id, promoted, conn).await?;
        info!(user_id = %user_id, from = %current, to = %promoted, "User promoted");
    }
    Ok(promoted)
}

fn claimant_notification(resolution: &ClaimResolution, business_name: &str) -> Notification {
    let (kind, title, message) = match resolution.status {
        ClaimStatus::Approved => (
            NotificationKind::ClaimApproved,
            "Claim approved".to_string(),
            format!("You are now the verified owner of {}.", business_name),
        ),
        _ => (
            NotificationKind::ClaimRejected,
            "Claim rejected".to_string(),
            format!("Your ownership claim for {} was not approved.", business_name),
        ),
    };

    Notification {
        user_id: resolution.claimant_id,
        kind,
        title,
        message,
        link: Some(format!("/businesses/{}", resolution.business_id)),
        metadata: serde_json::json!({
            "claim_id": resolution.claim_id,
            "business_id": resolution.business_id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(status: ClaimStatus) -> ClaimResolution {
        ClaimResolution {
            claim_id: ClaimId::new(),
            business_id: BusinessId::new(),
            claimant_id: UserId::new(),
            status,
            business_claim_status: BusinessClaimStatus::Approved,
            rejected_rivals: Vec::new(),
        }
    }

    #[test]
    fn approval_notification_targets_the_claimant() {
        let resolution = resolution(ClaimStatus::Approved);
        let n = claimant_notification(&resolution, "Taqueria Lupita");

        assert_eq!(n.user_id, resolution.claimant_id);
        assert_eq!(n.kind, NotificationKind::ClaimApproved);
        assert!(n.message.contains("Taqueria Lupita"));
        assert_eq!(
            n.link.as_deref(),
            Some(format!("/businesses/{}", resolution.business_id).as_str())
        );
        assert_eq!(n.metadata["claim_id"], serde_json::json!(resolution.claim_id));
    }

    #[test]
    fn rejection_notification_uses_rejected_kind() {
        let n = claimant_notification(&resolution(ClaimStatus::Rejected), "Cafe Nord");
        assert_eq!(n.kind, NotificationKind::ClaimRejected);
        assert_eq!(n.title, "Claim rejected");
    }
}
