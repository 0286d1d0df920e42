/// Profile of the authenticated user
///
/// `GET /v1/me`: the account, its items (any status) and the claims it submitted.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::views::{claim_detail_views, item_views, ClaimDetailView, ItemView},
};
use axum::{extract::State, Extension, Json};
use lostfound_shared::{auth::middleware::AuthContext, listing, models::user::User};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub items: Vec<ItemView>,
    pub claims: Vec<ClaimDetailView>,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = listing::profile(state.store(), auth.user_id).await?;

    Ok(Json(ProfileResponse {
        user: profile.user,
        items: item_views(profile.items),
        claims: claim_detail_views(profile.claims),
    }))
}
