/// Home dashboard
///
/// `GET /v1/home`: the newest active lost and found items plus site totals.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::views::{categories, item_views, CategoryView, ItemView},
};
use axum::{extract::State, Json};
use lostfound_shared::{listing, models::item::ItemStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub recent_lost: Vec<ItemView>,
    pub recent_found: Vec<ItemView>,
    pub stats: ItemStats,
    pub categories: Vec<CategoryView>,
}

pub async fn home(State(state): State<AppState>) -> ApiResult<Json<HomeResponse>> {
    let home = listing::home(state.store()).await?;

    Ok(Json(HomeResponse {
        recent_lost: item_views(home.recent_lost),
        recent_found: item_views(home.recent_found),
        stats: home.stats,
        categories: categories(),
    }))
}
