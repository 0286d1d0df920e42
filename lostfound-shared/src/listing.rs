/// Read models: search, home dashboard, item detail and profile
///
/// Nothing here mutates state. Search only ever returns `active` items;
/// owner-facing views (my items, profile) include every status.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{LifecycleError, LifecycleResult},
    models::{
        claim::ClaimDetail,
        item::{Item, ItemFilter, ItemStats, ItemType},
        user::User,
    },
    store::Store,
};

/// Results per search page
pub const PAGE_SIZE: i64 = 12;

/// Items per section on the home dashboard
pub const RECENT_LIMIT: i64 = 4;

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_results: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, page: i64, total_results: i64) -> Self {
        let total_pages = total_pages(total_results);
        Self {
            results,
            page,
            page_size: PAGE_SIZE,
            total_results,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Converts the results, keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_results: self.total_results,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Number of pages for a result count; an empty result still has one page
pub fn total_pages(total_results: i64) -> i64 {
    if total_results <= 0 {
        1
    } else {
        (total_results + PAGE_SIZE - 1) / PAGE_SIZE
    }
}

/// Parses a raw `page` query value
///
/// Missing, non-numeric or sub-1 values all mean page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// Largest page number whose offset still fits in an `i64`
pub const MAX_PAGE: i64 = i64::MAX / PAGE_SIZE;

/// Searches active items, 12 per page, newest first
///
/// A page past the end is answered with the last page.
pub async fn search(store: &dyn Store, filter: &ItemFilter, page: i64) -> LifecycleResult<Page<Item>> {
    let page = page.clamp(1, MAX_PAGE);

    let (results, total) = store
        .search_items(filter, PAGE_SIZE, (page - 1) * PAGE_SIZE)
        .await?;

    let last = total_pages(total);
    if page > last {
        let (results, total) = store
            .search_items(filter, PAGE_SIZE, (last - 1) * PAGE_SIZE)
            .await?;
        return Ok(Page::new(results, last, total));
    }

    Ok(Page::new(results, page, total))
}

/// Home dashboard content
#[derive(Debug, Clone, Serialize)]
pub struct Home {
    pub recent_lost: Vec<Item>,
    pub recent_found: Vec<Item>,
    pub stats: ItemStats,
}

pub async fn home(store: &dyn Store) -> LifecycleResult<Home> {
    let lost = ItemFilter {
        item_type: Some(ItemType::Lost),
        ..Default::default()
    };
    let found = ItemFilter {
        item_type: Some(ItemType::Found),
        ..Default::default()
    };

    let (recent_lost, _) = store.search_items(&lost, RECENT_LIMIT, 0).await?;
    let (recent_found, _) = store.search_items(&found, RECENT_LIMIT, 0).await?;
    let stats = store.item_stats().await?;

    Ok(Home {
        recent_lost,
        recent_found,
        stats,
    })
}

/// Item page content
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    pub item: Item,
    pub owner_username: String,
    pub pending_claims_count: i64,

    /// True when the viewer owns the item
    pub is_owner: bool,

    /// Whether the viewer already claimed this item; None for anonymous viewers
    pub viewer_has_claimed: Option<bool>,
}

/// Loads an item of any status with its display context
pub async fn item_detail(
    store: &dyn Store,
    item_id: Uuid,
    viewer: Option<Uuid>,
) -> LifecycleResult<ItemDetail> {
    let item = store
        .find_item(item_id)
        .await?
        .ok_or(LifecycleError::NotFound("Item"))?;

    let owner_username = store
        .find_user(item.owner_id)
        .await?
        .map(|owner| owner.username)
        .unwrap_or_default();

    let pending_claims_count = store.count_pending_claims(item_id).await?;

    let viewer_has_claimed = match viewer {
        Some(viewer_id) => Some(
            store
                .find_claim_by_item_and_claimant(item_id, viewer_id)
                .await?
                .is_some(),
        ),
        None => None,
    };

    Ok(ItemDetail {
        is_owner: viewer == Some(item.owner_id),
        item,
        owner_username,
        pending_claims_count,
        viewer_has_claimed,
    })
}

/// All items of the requester, newest first, any status
pub async fn my_items(store: &dyn Store, owner_id: Uuid) -> LifecycleResult<Vec<Item>> {
    Ok(store.list_items_by_owner(owner_id).await?)
}

/// Profile page content
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub items: Vec<Item>,
    pub claims: Vec<ClaimDetail>,
}

pub async fn profile(store: &dyn Store, user_id: Uuid) -> LifecycleResult<Profile> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(LifecycleError::NotFound("User"))?;

    let items = store.list_items_by_owner(user_id).await?;
    let claims = store.list_claims_by_claimant(user_id).await?;

    Ok(Profile {
        user,
        items,
        claims,
    })
}
