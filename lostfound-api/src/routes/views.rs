/// Response shapes shared by the route handlers
///
/// Stored rows are serialized flat, with the human-readable labels and
/// icon/badge lookups alongside so clients need no enum tables of their own.

use lostfound_shared::models::{
    claim::{ClaimDetail, ClaimRequest},
    item::{Item, ItemCategory},
};
use serde::Serialize;

/// Item with display labels
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,

    /// e.g. `[Lost] Blue umbrella`
    pub display_title: String,
    pub category_label: &'static str,
    pub category_icon: &'static str,
    pub item_type_label: &'static str,
    pub item_type_badge: &'static str,
    pub status_label: &'static str,
    pub status_badge: &'static str,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            display_title: item.display_title(),
            category_label: item.category.label(),
            category_icon: item.category.icon(),
            item_type_label: item.item_type.label(),
            item_type_badge: item.item_type.badge_class(),
            status_label: item.status.label(),
            status_badge: item.status.badge_class(),
            item,
        }
    }
}

pub fn item_views(items: Vec<Item>) -> Vec<ItemView> {
    items.into_iter().map(ItemView::from).collect()
}

/// Claim with status labels
#[derive(Debug, Clone, Serialize)]
pub struct ClaimView {
    #[serde(flatten)]
    pub claim: ClaimRequest,

    pub status_label: &'static str,
    pub status_badge: &'static str,
}

impl From<ClaimRequest> for ClaimView {
    fn from(claim: ClaimRequest) -> Self {
        Self {
            status_label: claim.status.label(),
            status_badge: claim.status.badge_class(),
            claim,
        }
    }
}

/// Claim with the item title, claimant name and status labels
#[derive(Debug, Clone, Serialize)]
pub struct ClaimDetailView {
    #[serde(flatten)]
    pub detail: ClaimDetail,

    pub status_label: &'static str,
    pub status_badge: &'static str,
}

impl From<ClaimDetail> for ClaimDetailView {
    fn from(detail: ClaimDetail) -> Self {
        Self {
            status_label: detail.claim.status.label(),
            status_badge: detail.claim.status.badge_class(),
            detail,
        }
    }
}

pub fn claim_detail_views(claims: Vec<ClaimDetail>) -> Vec<ClaimDetailView> {
    claims.into_iter().map(ClaimDetailView::from).collect()
}

/// Category choice for filter menus
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub value: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub fn categories() -> Vec<CategoryView> {
    ItemCategory::ALL
        .into_iter()
        .map(|category| CategoryView {
            value: category.as_str(),
            label: category.label(),
            icon: category.icon(),
        })
        .collect()
}
