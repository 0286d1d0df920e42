/// Persistence seam for users, items and claims
///
/// The lifecycle operations in [`crate::lifecycle`] and the read models in
/// [`crate::listing`] only talk to a `&dyn Store`. Two implementations ship:
///
/// - [`postgres::PgStore`]: PostgreSQL through `sqlx`, atomic sections are transactions
/// - [`memory::MemoryStore`]: hash maps behind a `tokio::sync::RwLock`, used by the
///   test suites and by `STORAGE_BACKEND=memory`
///
/// # Atomicity contract
///
/// `insert_claim`, `close_item`, `approve_claim` and `reject_claim` re-check
/// the state they depend on inside their atomic section. Callers may fail fast
/// on a stale read, but the store's answer is authoritative.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    claim::{ApprovalOutcome, ClaimDetail, ClaimRequest, RejectionOutcome, SubmitOutcome},
    item::{Item, ItemFields, ItemFilter, ItemStats},
    user::{CreateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if the error is a violation of the named unique constraint
    pub fn is_unique_violation_of(&self, constraint: &str) -> bool {
        matches!(self, StoreError::UniqueViolation(name) if name == constraint)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend used by the lifecycle manager
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    // Users

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn record_login(&self, id: Uuid) -> StoreResult<()>;

    // Items

    /// Stores a new item in `active` status
    async fn insert_item(&self, owner_id: Uuid, fields: ItemFields) -> StoreResult<Item>;

    async fn find_item(&self, id: Uuid) -> StoreResult<Option<Item>>;

    /// Replaces the editable fields; status is untouched
    async fn update_item_fields(&self, id: Uuid, fields: ItemFields) -> StoreResult<Option<Item>>;

    /// Moves an `active` item to `closed`
    ///
    /// Returns None if the item is missing or not active.
    async fn close_item(&self, id: Uuid) -> StoreResult<Option<Item>>;

    /// Deletes an item and all of its claims atomically
    async fn delete_item(&self, id: Uuid) -> StoreResult<bool>;

    /// Every item of an owner, newest first
    async fn list_items_by_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Item>>;

    /// One page of active items matching the filter, newest first, plus the total match count
    async fn search_items(
        &self,
        filter: &ItemFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<Item>, i64)>;

    async fn item_stats(&self) -> StoreResult<ItemStats>;

    // Claims

    /// Inserts a pending claim if the item is still active
    ///
    /// A duplicate (item, claimant) pair fails with
    /// `StoreError::UniqueViolation(ITEM_CLAIMANT_CONSTRAINT)`.
    async fn insert_claim(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
        message: &str,
    ) -> StoreResult<SubmitOutcome>;

    async fn find_claim(&self, id: Uuid) -> StoreResult<Option<ClaimRequest>>;

    async fn find_claim_by_item_and_claimant(
        &self,
        item_id: Uuid,
        claimant_id: Uuid,
    ) -> StoreResult<Option<ClaimRequest>>;

    /// All claims on an item, newest first
    async fn list_claims_by_item(&self, item_id: Uuid) -> StoreResult<Vec<ClaimDetail>>;

    /// All claims submitted by a user, newest first
    async fn list_claims_by_claimant(&self, claimant_id: Uuid) -> StoreResult<Vec<ClaimDetail>>;

    async fn count_pending_claims(&self, item_id: Uuid) -> StoreResult<i64>;

    /// Approves the claim, claims the item and rejects sibling pending claims as one unit
    async fn approve_claim(&self, claim_id: Uuid) -> StoreResult<ApprovalOutcome>;

    /// Rejects the claim if it is still pending
    async fn reject_claim(&self, claim_id: Uuid) -> StoreResult<RejectionOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_matching() {
        let err = StoreError::UniqueViolation("users_username_key".to_string());
        assert!(err.is_unique_violation_of("users_username_key"));
        assert!(!err.is_unique_violation_of("claim_requests_item_claimant_key"));

        let err = StoreError::Database(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation_of("users_username_key"));
    }
}
