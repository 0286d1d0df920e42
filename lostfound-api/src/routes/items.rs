/// Item endpoints
///
/// - `GET    /v1/items` - Search active items (public)
/// - `POST   /v1/items` - Report a lost or found item
/// - `GET    /v1/items/mine` - The requester's items, any status
/// - `GET    /v1/items/:id` - Item detail (optional auth)
/// - `PUT    /v1/items/:id` - Edit (owner only)
/// - `DELETE /v1/items/:id` - Delete with its claims (owner only)
/// - `POST   /v1/items/:id/close` - Close (owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::views::{item_views, ItemView},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use lostfound_shared::{
    auth::middleware::AuthContext,
    lifecycle::items,
    listing::{self, Page},
    models::item::{ItemCategory, ItemFields, ItemFilter, ItemType},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Raw search query parameters
///
/// Kept as strings so blank values (`?category=`) mean "no filter" and
/// unknown values produce a field-level validation error.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub item_type: Option<String>,
    pub page: Option<String>,
}

/// Parses an optional enum filter; blank means absent
fn parse_filter<T: FromStr>(field: &str, raw: Option<&str>) -> ApiResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::invalid(field, e.to_string())),
        None => Ok(None),
    }
}

impl SearchParams {
    pub fn filter(&self) -> ApiResult<ItemFilter> {
        Ok(ItemFilter {
            query: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            category: parse_filter::<ItemCategory>("category", self.category.as_deref())?,
            item_type: parse_filter::<ItemType>("item_type", self.item_type.as_deref())?,
        })
    }
}

/// Search active items, 12 per page, newest first
///
/// ```text
/// GET /v1/items?q=wallet&category=bags&item_type=lost&page=2
/// ```
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Page<ItemView>>> {
    let filter = params.filter()?;
    let page = listing::parse_page(params.page.as_deref());

    let results = listing::search(state.store(), &filter, page).await?;
    Ok(Json(results.map(ItemView::from)))
}

/// Report an item; it starts `active`
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(fields): ApiJson<ItemFields>,
) -> ApiResult<(StatusCode, Json<ItemView>)> {
    let item = items::create(state.store(), auth.user_id, fields).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn my_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ItemView>>> {
    let items = listing::my_items(state.store(), auth.user_id).await?;
    Ok(Json(item_views(items)))
}

/// Item page content
#[derive(Debug, Serialize)]
pub struct ItemDetailResponse {
    pub item: ItemView,
    pub owner_username: String,
    pub pending_claims_count: i64,
    pub is_owner: bool,

    /// Absent for anonymous viewers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_has_claimed: Option<bool>,

    /// Whether the viewer may submit a claim right now
    pub can_claim: bool,
}

/// Item detail, any status
pub async fn get_item(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<Uuid>,
    auth: Option<Extension<AuthContext>>,
) -> ApiResult<Json<ItemDetailResponse>> {
    let viewer = auth.map(|Extension(auth)| auth.user_id);
    let detail = listing::item_detail(state.store(), item_id, viewer).await?;

    let can_claim = viewer.is_some()
        && !detail.is_owner
        && detail.item.status.accepts_claims()
        && detail.viewer_has_claimed == Some(false);

    Ok(Json(ItemDetailResponse {
        item: detail.item.into(),
        owner_username: detail.owner_username,
        pending_claims_count: detail.pending_claims_count,
        is_owner: detail.is_owner,
        viewer_has_claimed: detail.viewer_has_claimed,
        can_claim,
    }))
}

/// Replace the editable fields (owner only)
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(item_id): ApiPath<Uuid>,
    ApiJson(fields): ApiJson<ItemFields>,
) -> ApiResult<Json<ItemView>> {
    let item = items::edit(state.store(), item_id, auth.user_id, fields).await?;
    Ok(Json(item.into()))
}

/// Delete an item and every claim on it (owner only)
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(item_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    items::delete(state.store(), item_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close an active item (owner only)
pub async fn close_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(item_id): ApiPath<Uuid>,
) -> ApiResult<Json<ItemView>> {
    let item = items::close(state.store(), item_id, auth.user_id).await?;
    Ok(Json(item.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(category: Option<&str>, item_type: Option<&str>) -> SearchParams {
        SearchParams {
            q: Some("  wallet  ".to_string()),
            category: category.map(str::to_string),
            item_type: item_type.map(str::to_string),
            page: None,
        }
    }

    #[test]
    fn test_filter_parses_known_values() {
        let filter = params(Some("bags"), Some("lost")).filter().unwrap();
        assert_eq!(filter.query.as_deref(), Some("wallet"));
        assert_eq!(filter.category, Some(ItemCategory::Bags));
        assert_eq!(filter.item_type, Some(ItemType::Lost));
    }

    #[test]
    fn test_blank_filters_mean_no_filter() {
        let filter = params(Some(""), Some("  ")).filter().unwrap();
        assert_eq!(filter.category, None);
        assert_eq!(filter.item_type, None);
    }

    #[test]
    fn test_unknown_filter_value_is_rejected() {
        let err = params(Some("furniture"), None).filter().unwrap_err();
        let ApiError::ValidationError(details) = err else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "category");

        assert!(params(None, Some("stolen")).filter().is_err());
    }
}
