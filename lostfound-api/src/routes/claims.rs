/// Claim endpoints
///
/// - `POST /v1/items/:id/claims` - Submit a claim on someone else's item
/// - `GET  /v1/items/:id/claims` - Manage claims (item owner only)
/// - `POST /v1/claims/:id/approve` - Approve; the item becomes claimed
/// - `POST /v1/claims/:id/reject` - Reject

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    routes::views::{claim_detail_views, ClaimDetailView, ClaimView, ItemView},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use lostfound_shared::{auth::middleware::AuthContext, lifecycle::claims};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim submission body
#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    /// Why the claimant believes the item is theirs
    pub message: String,
}

pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(item_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SubmitClaimRequest>,
) -> ApiResult<(StatusCode, Json<ClaimView>)> {
    let claim = claims::submit(state.store(), item_id, auth.user_id, &req.message).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

#[derive(Debug, Serialize)]
pub struct ItemClaimsResponse {
    pub item: ItemView,

    /// Newest first
    pub claims: Vec<ClaimDetailView>,
}

pub async fn list_item_claims(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(item_id): ApiPath<Uuid>,
) -> ApiResult<Json<ItemClaimsResponse>> {
    let (item, claims) = claims::list_for_owner(state.store(), item_id, auth.user_id).await?;

    Ok(Json(ItemClaimsResponse {
        item: item.into(),
        claims: claim_detail_views(claims),
    }))
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub message: String,
    pub claim: ClaimView,

    /// The item, now claimed
    pub item: ItemView,

    /// Other pending claims rejected by this approval
    pub rejected_siblings: u64,
}

/// Approve a pending claim (item owner only)
///
/// Approving an already approved claim returns the current state.
pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(claim_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApprovalResponse>> {
    let approval = claims::approve(state.store(), claim_id, auth.user_id).await?;

    let message = format!(
        "Claim approved! \"{}\" has been marked as claimed.",
        approval.item.title
    );

    Ok(Json(ApprovalResponse {
        message,
        claim: approval.claim.into(),
        item: approval.item.into(),
        rejected_siblings: approval.rejected_siblings,
    }))
}

/// Reject a pending claim (item owner only)
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(claim_id): ApiPath<Uuid>,
) -> ApiResult<Json<ClaimView>> {
    let claim = claims::reject(state.store(), claim_id, auth.user_id).await?;
    Ok(Json(claim.into()))
}
