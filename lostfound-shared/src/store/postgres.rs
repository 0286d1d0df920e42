/// PostgreSQL-backed store
///
/// Thin adapter over the model methods in [`crate::models`]; every atomic
/// section of the [`Store`] contract is a single database transaction there.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::{
    db::pool::health_check,
    models::{
        claim::{ApprovalOutcome, ClaimDetail, ClaimRequest, RejectionOutcome, SubmitOutcome},
        item::{Item, ItemFields, ItemFilter, ItemStats},
        user::{CreateUser, User},
    },
};

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        User::update_last_login(&self.pool, id).await?;
        Ok(())
    }

    async fn insert_item(&self, owner_id: Uuid, fields: ItemFields) -> StoreResult<Item> {
        Ok(Item::create(&self.pool, owner_id, fields).await?)
    }

    async fn find_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        Ok(Item::find_by_id(&self.pool, id).await?)
    }

    async fn update_item_fields(&self, id: Uuid, fields: ItemFields) -> StoreResult<Option<Item>> {
        Ok(Item::update_fields(&self.pool, id, fields).await?)
    }

    async fn close_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        Ok(Item::transition_to_closed(&self.pool, id).await?)
    }

    async fn delete_item(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Item::delete(&self.pool, id).await?)
    }

    async fn list_items_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Item>> {
        Ok(Item::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn search_items(
        &self,
        filter: &ItemFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Item>, i64)> {
        Ok(Item::search(&self.pool, filter, limit, offset).await?)
    }

    async fn item_stats(&self) -> StoreResult<ItemStats> {
        Ok(Item::stats(&self.pool).await?)
    }

    async fn insert_claim(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
        message: &str,
    ) -> StoreResult<SubmitOutcome> {
        Ok(ClaimRequest::create(&self.pool, item_id, claimant_id, message).await?)
    }

    async fn find_claim(&self, id: Uuid) -> StoreResult<Option<ClaimRequest>> {
        Ok(ClaimRequest::find_by_id(&self.pool, id).await?)
    }

    async fn find_claim_by_item_and_claimant(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
    ) -> StoreResult<Option<ClaimRequest>> {
        Ok(ClaimRequest::find_by_item_and_claimant(&self.pool, item_id, claimant_id).await?)
    }

    async fn list_claims_by_item(&self, item_id: Uuid) -> StoreResult<Vec<ClaimDetail>> {
        Ok(ClaimRequest::list_by_item(&self.pool, item_id).await?)
    }

    async fn list_claims_by_claimant(&self, claimant_id: Uuid) -> StoreResult<Vec<ClaimDetail>> {
        Ok(ClaimRequest::list_by_claimant(&self.pool, claimant_id).await?)
    }

    async fn count_pending_claims(&self, item_id: Uuid) -> StoreResult<i64> {
        Ok(ClaimRequest::count_pending_for_item(&self.pool, item_id).await?)
    }

    async fn approve_claim(&self, claim_id: Uuid) -> StoreResult<ApprovalOutcome> {
        Ok(ClaimRequest::approve(&self.pool, claim_id).await?)
    }

    async fn reject_claim(&self, claim_id: Uuid) -> StoreResult<RejectionOutcome> {
        Ok(ClaimRequest::reject(&self.pool, claim_id).await?)
    }
}
