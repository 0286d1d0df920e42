/// In-memory store
///
/// Mirrors the PostgreSQL schema with hash maps behind one `tokio::sync::RwLock`.
/// Every mutating operation holds the write lock for its whole duration, which
/// gives it the same all-or-nothing behaviour as the transactional queries in
/// [`super::postgres::PgStore`].
///
/// # Example
///
/// ```
/// use lostfound_shared::store::{memory::MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.ping().await?;
/// assert_eq!(store.backend(), "memory");
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{
    claim::{
        ApprovalOutcome, ClaimDetail, ClaimRequest, ClaimStatus, RejectionOutcome, SubmitOutcome,
        ITEM_CLAIMANT_CONSTRAINT,
    },
    item::{Item, ItemFields, ItemFilter, ItemStats, ItemStatus, ItemType},
    user::{CreateUser, User, USERNAME_CONSTRAINT},
};

/// Record plus its insertion sequence, used to order rows created in the same instant
#[derive(Debug, Clone)]
struct Row<T> {
    seq: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    items: HashMap<Uuid, Row<Item>>,
    claims: HashMap<Uuid, Row<ClaimRequest>>,
    next_seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn detail(&self, claim: &ClaimRequest) -> ClaimDetail {
        ClaimDetail {
            claim: claim.clone(),
            item_title: self
                .items
                .get(&claim.item_id)
                .map(|row| row.value.title.clone())
                .unwrap_or_default(),
            claimant_username: self
                .users
                .get(&claim.claimant_id)
                .map(|user| user.username.clone())
                .unwrap_or_default(),
        }
    }

    /// Claims matching the predicate as display rows, newest first
    fn claim_details(&self, predicate: impl Fn(&ClaimRequest) -> bool) -> Vec<ClaimDetail> {
        let mut rows: Vec<&Row<ClaimRequest>> = self
            .claims
            .values()
            .filter(|row| predicate(&row.value))
            .collect();
        rows.sort_by(|a, b| newest_first((a.value.created_at, a.seq), (b.value.created_at, b.seq)));
        rows.into_iter().map(|row| self.detail(&row.value)).collect()
    }
}

fn newest_first(a: (DateTime<Utc>, u64), b: (DateTime<Utc>, u64)) -> std::cmp::Ordering {
    b.cmp(&a)
}

fn sorted_items<'a>(rows: impl Iterator<Item = &'a Row<Item>>) -> Vec<Item> {
    let mut rows: Vec<&Row<Item>> = rows.collect();
    rows.sort_by(|a, b| newest_first((a.value.created_at, a.seq), (b.value.created_at, b.seq)));
    rows.into_iter().map(|row| row.value.clone()).collect()
}

/// Store holding all data in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == data.username) {
            return Err(StoreError::UniqueViolation(USERNAME_CONSTRAINT.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            created_at: Utc::now(),
            last_login_at: None,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn insert_item(&self, owner_id: Uuid, fields: ItemFields) -> StoreResult<Item> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let item = Item {
            id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            description: fields.description,
            category: fields.category,
            item_type: fields.item_type,
            location: fields.location,
            date_reported: fields.date_reported,
            image: fields.image,
            status: ItemStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let seq = tables.next_seq();
        tables.items.insert(
            item.id,
            Row {
                seq,
                value: item.clone(),
            },
        );

        Ok(item)
    }

    async fn find_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&id).map(|row| row.value.clone()))
    }

    async fn update_item_fields(&self, id: Uuid, fields: ItemFields) -> StoreResult<Option<Item>> {
        let mut tables = self.tables.write().await;

        let Some(row) = tables.items.get_mut(&id) else {
            return Ok(None);
        };

        let item = &mut row.value;
        item.title = fields.title;
        item.description = fields.description;
        item.category = fields.category;
        item.item_type = fields.item_type;
        item.location = fields.location;
        item.date_reported = fields.date_reported;
        item.image = fields.image;
        item.updated_at = Utc::now();

        Ok(Some(item.clone()))
    }

    async fn close_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        let mut tables = self.tables.write().await;

        match tables.items.get_mut(&id) {
            Some(row) if row.value.status.can_transition_to(ItemStatus::Closed) => {
                row.value.status = ItemStatus::Closed;
                row.value.updated_at = Utc::now();
                Ok(Some(row.value.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let removed = tables.items.remove(&id).is_some();
        if removed {
            tables.claims.retain(|_, row| row.value.item_id != id);
        }

        Ok(removed)
    }

    async fn list_items_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(sorted_items(
            tables.items.values().filter(|row| row.value.owner_id == owner_id),
        ))
    }

    async fn search_items(
        &self,
        filter: &ItemFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Item>, i64)> {
        let tables = self.tables.read().await;

        let matches = sorted_items(tables.items.values().filter(|row| filter.matches(&row.value)));
        let total = i64::try_from(matches.len()).unwrap_or(i64::MAX);

        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        let page = matches.into_iter().skip(offset).take(limit).collect();

        Ok((page, total))
    }

    async fn item_stats(&self) -> StoreResult<ItemStats> {
        let tables = self.tables.read().await;

        let mut stats = ItemStats::default();
        for row in tables.items.values() {
            let item = &row.value;
            stats.total_items += 1;
            match item.item_type {
                ItemType::Lost => stats.total_lost += 1,
                ItemType::Found => stats.total_found += 1,
            }
            if item.status == ItemStatus::Claimed {
                stats.total_claimed += 1;
            }
        }

        Ok(stats)
    }

    async fn insert_claim(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
        message: &str,
    ) -> StoreResult<SubmitOutcome> {
        let mut tables = self.tables.write().await;

        match tables.items.get(&item_id) {
            None => return Ok(SubmitOutcome::ItemNotFound),
            Some(row) if !row.value.status.accepts_claims() => {
                return Ok(SubmitOutcome::ItemNotActive(row.value.status))
            }
            Some(_) => {}
        }

        let duplicate = tables
            .claims
            .values()
            .any(|row| row.value.item_id == item_id && row.value.claimant_id == claimant_id);
        if duplicate {
            return Err(StoreError::UniqueViolation(
                ITEM_CLAIMANT_CONSTRAINT.to_string(),
            ));
        }

        let claim = ClaimRequest {
            id: Uuid::new_v4(),
            item_id,
            claimant_id,
            message: message.to_string(),
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
        };

        let seq = tables.next_seq();
        tables.claims.insert(
            claim.id,
            Row {
                seq,
                value: claim.clone(),
            },
        );

        Ok(SubmitOutcome::Created(claim))
    }

    async fn find_claim(&self, id: Uuid) -> StoreResult<Option<ClaimRequest>> {
        let tables = self.tables.read().await;
        Ok(tables.claims.get(&id).map(|row| row.value.clone()))
    }

    async fn find_claim_by_item_and_claimant(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
    ) -> StoreResult<Option<ClaimRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .claims
            .values()
            .find(|row| row.value.item_id == item_id && row.value.claimant_id == claimant_id)
            .map(|row| row.value.clone()))
    }

    async fn list_claims_by_item(&self, item_id: Uuid) -> StoreResult<Vec<ClaimDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.claim_details(|claim| claim.item_id == item_id))
    }

    async fn list_claims_by_claimant(&self, claimant_id: Uuid) -> StoreResult<Vec<ClaimDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.claim_details(|claim| claim.claimant_id == claimant_id))
    }

    async fn count_pending_claims(&self, item_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .claims
            .values()
            .filter(|row| row.value.item_id == item_id && row.value.status == ClaimStatus::Pending)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn approve_claim(&self, claim_id: Uuid) -> StoreResult<ApprovalOutcome> {
        let mut tables = self.tables.write().await;

        let Some(claim) = tables.claims.get(&claim_id).map(|row| row.value.clone()) else {
            return Ok(ApprovalOutcome::NotFound);
        };
        let Some(item) = tables.items.get(&claim.item_id).map(|row| row.value.clone()) else {
            return Ok(ApprovalOutcome::NotFound);
        };

        if claim.status == ClaimStatus::Approved {
            return Ok(ApprovalOutcome::AlreadyApproved { claim, item });
        }
        if !claim.status.can_transition_to(ClaimStatus::Approved) {
            return Ok(ApprovalOutcome::ClaimRejected(claim));
        }
        if !item.status.can_transition_to(ItemStatus::Claimed) {
            return Ok(ApprovalOutcome::ItemNotActive { claim, item });
        }

        let mut rejected_siblings = 0;
        let mut approved = claim;
        for row in tables.claims.values_mut() {
            let sibling = &mut row.value;
            if sibling.id == claim_id {
                sibling.status = ClaimStatus::Approved;
                approved = sibling.clone();
            } else if sibling.item_id == approved.item_id && sibling.status == ClaimStatus::Pending {
                sibling.status = ClaimStatus::Rejected;
                rejected_siblings += 1;
            }
        }

        let mut claimed = item;
        if let Some(row) = tables.items.get_mut(&claimed.id) {
            row.value.status = ItemStatus::Claimed;
            row.value.updated_at = Utc::now();
            claimed = row.value.clone();
        }

        Ok(ApprovalOutcome::Approved {
            claim: approved,
            item: claimed,
            rejected_siblings,
        })
    }

    async fn reject_claim(&self, claim_id: Uuid) -> StoreResult<RejectionOutcome> {
        let mut tables = self.tables.write().await;

        let Some(row) = tables.claims.get_mut(&claim_id) else {
            return Ok(RejectionOutcome::NotFound);
        };

        let claim = &mut row.value;
        let outcome = if claim.status.can_transition_to(ClaimStatus::Rejected) {
            claim.status = ClaimStatus::Rejected;
            RejectionOutcome::Rejected(claim.clone())
        } else if claim.status == ClaimStatus::Rejected {
            RejectionOutcome::AlreadyRejected(claim.clone())
        } else {
            RejectionOutcome::ClaimApproved(claim.clone())
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fields(title: &str) -> ItemFields {
        ItemFields {
            title: title.to_string(),
            description: "Found near the entrance".to_string(),
            category: Default::default(),
            item_type: ItemType::Found,
            location: "Main Hall".to_string(),
            date_reported: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            image: None,
        }
    }

    async fn user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(CreateUser {
                username: name.to_string(),
                email: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let store = MemoryStore::new();
        user(&store, "alice").await;

        let err = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                email: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_of(USERNAME_CONSTRAINT));
    }

    #[tokio::test]
    async fn test_items_listed_newest_first() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await;

        let first = store.insert_item(owner.id, fields("first")).await.unwrap();
        let second = store.insert_item(owner.id, fields("second")).await.unwrap();

        let items = store.list_items_by_owner(owner.id).await.unwrap();
        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_close_only_from_active() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await;
        let item = store.insert_item(owner.id, fields("umbrella")).await.unwrap();

        let closed = store.close_item(item.id).await.unwrap().unwrap();
        assert_eq!(closed.status, ItemStatus::Closed);
        assert!(store.close_item(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_item_removes_claims() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await;
        let claimant = user(&store, "bob").await;
        let item = store.insert_item(owner.id, fields("wallet")).await.unwrap();

        let SubmitOutcome::Created(claim) =
            store.insert_claim(item.id, claimant.id, "mine").await.unwrap()
        else {
            panic!("claim should be created");
        };

        assert!(store.delete_item(item.id).await.unwrap());
        assert!(store.find_claim(claim.id).await.unwrap().is_none());
        assert!(!store.delete_item(item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_pagination_window() {
        let store = MemoryStore::new();
        let owner = user(&store, "alice").await;
        for n in 0..5 {
            store
                .insert_item(owner.id, fields(&format!("item {}", n)))
                .await
                .unwrap();
        }

        let (page, total) = store
            .search_items(&ItemFilter::default(), 2, 4)
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "item 0");
    }
}
