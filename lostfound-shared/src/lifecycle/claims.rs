/// Claim lifecycle operations
///
/// # Rules
///
/// - A claimant may not claim their own item
/// - Only active items accept claims, and each user gets one claim per item
/// - Only the item owner approves or rejects
/// - Approval claims the item and rejects every other pending claim in one
///   atomic store call; at most one claim per item is ever approved
///
/// Each operation reads first to fail fast with the precise error, then lets
/// the store re-check inside its atomic section. When the two disagree the
/// store wins and the error reflects the state it observed.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::{validate, LifecycleError, LifecycleResult},
    models::{
        claim::{
            ApprovalOutcome, ClaimDetail, ClaimInput, ClaimRequest, ClaimStatus, RejectionOutcome,
            SubmitOutcome, ITEM_CLAIMANT_CONSTRAINT,
        },
        item::Item,
    },
    store::Store,
};

use super::items::find_owned;

/// Result of a successful approval
#[derive(Debug, Clone)]
pub struct Approval {
    pub claim: ClaimRequest,

    /// The item, now `claimed`
    pub item: Item,

    /// Number of other pending claims rejected by this approval (0 on a repeat call)
    pub rejected_siblings: u64,
}

/// Submits a claim on someone else's active item
pub async fn submit(
    store: &dyn Store,
    item_id: Uuid,
    claimant_id: Uuid,
    message: &str,
) -> LifecycleResult<ClaimRequest> {
    let item = store
        .find_item(item_id)
        .await?
        .ok_or(LifecycleError::NotFound("Item"))?;

    if item.owner_id == claimant_id {
        debug!(item_id = %item_id, claimant_id = %claimant_id, "Rejected self-claim");
        return Err(LifecycleError::SelfClaim);
    }

    if !item.status.accepts_claims() {
        return Err(LifecycleError::InactiveItem(item.status));
    }

    if store
        .find_claim_by_item_and_claimant(item_id, claimant_id)
        .await?
        .is_some()
    {
        return Err(LifecycleError::DuplicateClaim);
    }

    let input = ClaimInput {
        message: message.trim().to_string(),
    };
    validate(&input)?;

    let outcome = match store.insert_claim(item_id, claimant_id, &input.message).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_unique_violation_of(ITEM_CLAIMANT_CONSTRAINT) => {
            return Err(LifecycleError::DuplicateClaim)
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        SubmitOutcome::Created(claim) => {
            info!(
                claim_id = %claim.id,
                item_id = %item_id,
                claimant_id = %claimant_id,
                "Claim submitted"
            );
            Ok(claim)
        }
        SubmitOutcome::ItemNotActive(status) => Err(LifecycleError::InactiveItem(status)),
        SubmitOutcome::ItemNotFound => Err(LifecycleError::NotFound("Item")),
    }
}

/// Loads a claim and checks that `requester` owns the claimed item
async fn find_for_owner(
    store: &dyn Store,
    claim_id: Uuid,
    requester: Uuid,
) -> LifecycleResult<(ClaimRequest, Item)> {
    let claim = store
        .find_claim(claim_id)
        .await?
        .ok_or(LifecycleError::NotFound("Claim"))?;

    let item = find_owned(store, claim.item_id, requester).await?;

    Ok((claim, item))
}

/// Approves a claim
///
/// Approving an already approved claim returns the current state without
/// repeating any side effect.
pub async fn approve(store: &dyn Store, claim_id: Uuid, requester: Uuid) -> LifecycleResult<Approval> {
    let (claim, _) = find_for_owner(store, claim_id, requester).await?;

    if claim.status == ClaimStatus::Rejected {
        return Err(LifecycleError::Conflict(
            "A rejected claim cannot be approved".to_string(),
        ));
    }

    match store.approve_claim(claim_id).await? {
        ApprovalOutcome::Approved {
            claim,
            item,
            rejected_siblings,
        } => {
            info!(
                claim_id = %claim.id,
                item_id = %item.id,
                rejected_siblings,
                "Claim approved, item marked as claimed"
            );
            Ok(Approval {
                claim,
                item,
                rejected_siblings,
            })
        }
        ApprovalOutcome::AlreadyApproved { claim, item } => {
            debug!(claim_id = %claim.id, "Claim already approved");
            Ok(Approval {
                claim,
                item,
                rejected_siblings: 0,
            })
        }
        ApprovalOutcome::ClaimRejected(claim) => {
            warn!(claim_id = %claim.id, "Claim was rejected before approval completed");
            Err(LifecycleError::Conflict(
                "A rejected claim cannot be approved".to_string(),
            ))
        }
        ApprovalOutcome::ItemNotActive { claim, item } => {
            warn!(
                claim_id = %claim.id,
                item_id = %item.id,
                item_status = %item.status,
                "Approval refused, item no longer active"
            );
            Err(LifecycleError::Conflict(format!(
                "This item is already {}",
                item.status
            )))
        }
        ApprovalOutcome::NotFound => Err(LifecycleError::NotFound("Claim")),
    }
}

/// Rejects a pending claim
///
/// Rejecting an already rejected claim is a no-op. The item is never touched.
pub async fn reject(
    store: &dyn Store,
    claim_id: Uuid,
    requester: Uuid,
) -> LifecycleResult<ClaimRequest> {
    find_for_owner(store, claim_id, requester).await?;

    match store.reject_claim(claim_id).await? {
        RejectionOutcome::Rejected(claim) => {
            info!(claim_id = %claim.id, item_id = %claim.item_id, "Claim rejected");
            Ok(claim)
        }
        RejectionOutcome::AlreadyRejected(claim) => Ok(claim),
        RejectionOutcome::ClaimApproved(_) => Err(LifecycleError::Conflict(
            "An approved claim cannot be rejected".to_string(),
        )),
        RejectionOutcome::NotFound => Err(LifecycleError::NotFound("Claim")),
    }
}

/// Lists every claim on an item for its owner, newest first
pub async fn list_for_owner(
    store: &dyn Store,
    item_id: Uuid,
    requester: Uuid,
) -> LifecycleResult<(Item, Vec<ClaimDetail>)> {
    let item = find_owned(store, item_id, requester).await?;
    let claims = store.list_claims_by_item(item_id).await?;
    Ok((item, claims))
}
