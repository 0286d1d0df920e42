/// Claim request model and database operations
///
/// A claim request is a claimant's assertion of ownership over an item. The
/// item's owner reviews it and either approves or rejects it.
///
/// # State Machine
///
/// ```text
/// pending → approved
/// pending → rejected
/// ```
///
/// Approving one claim marks the item `claimed` and rejects every other
/// pending claim on the same item, all in one transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE claim_requests (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     item_id UUID NOT NULL REFERENCES items(id) ON DELETE CASCADE,
///     claimant_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     message TEXT NOT NULL,
///     status claim_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     CONSTRAINT claim_requests_item_claimant_key UNIQUE (item_id, claimant_id)
/// );
///
/// CREATE UNIQUE INDEX claim_requests_one_approved_per_item
///     ON claim_requests (item_id) WHERE status = 'approved';
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::item::{Item, ItemStatus};

const CLAIM_COLUMNS: &str = "id, item_id, claimant_id, message, status, created_at";

/// Name of the unique constraint on (item_id, claimant_id)
pub const ITEM_CLAIMANT_CONSTRAINT: &str = "claim_requests_item_claimant_key";

/// Claim review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Waiting for the item owner's decision
    Pending,

    /// Accepted by the item owner
    Approved,

    /// Declined by the owner, or superseded by another approved claim
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "badge-pending",
            ClaimStatus::Approved => "badge-approved",
            ClaimStatus::Rejected => "badge-rejected",
        }
    }

    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        matches!(
            (self, target),
            (ClaimStatus::Pending, ClaimStatus::Approved)
                | (ClaimStatus::Pending, ClaimStatus::Rejected)
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim request on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClaimRequest {
    pub id: Uuid,

    /// Item being claimed
    pub item_id: Uuid,

    /// User asserting ownership
    pub claimant_id: Uuid,

    /// Why the claimant believes the item is theirs
    pub message: String,

    pub status: ClaimStatus,

    pub created_at: DateTime<Utc>,
}

/// Claim joined with the names needed to display it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClaimDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub claim: ClaimRequest,

    pub item_title: String,

    pub claimant_username: String,
}

/// Claim submission input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClaimInput {
    #[validate(length(min = 1, max = 2000, message = "Claim message must be 1-2000 characters"))]
    pub message: String,
}

/// Result of inserting a claim
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Claim stored with status `pending`
    Created(ClaimRequest),

    /// The item no longer accepts claims
    ItemNotActive(ItemStatus),

    ItemNotFound,
}

/// Result of the atomic approve sequence
#[derive(Debug, Clone)]
pub enum ApprovalOutcome {
    /// Claim approved, item claimed, `rejected_siblings` pending claims rejected
    Approved {
        claim: ClaimRequest,
        item: Item,
        rejected_siblings: u64,
    },

    /// The claim was approved earlier; nothing changed
    AlreadyApproved { claim: ClaimRequest, item: Item },

    /// The claim was rejected earlier; nothing changed
    ClaimRejected(ClaimRequest),

    /// The item is claimed or closed; nothing changed
    ItemNotActive { claim: ClaimRequest, item: Item },

    NotFound,
}

/// Result of a rejection
#[derive(Debug, Clone)]
pub enum RejectionOutcome {
    Rejected(ClaimRequest),

    /// The claim was rejected earlier; nothing changed
    AlreadyRejected(ClaimRequest),

    /// The claim is approved and can no longer be rejected
    ClaimApproved(ClaimRequest),

    NotFound,
}

impl ClaimRequest {
    /// Inserts a pending claim
    ///
    /// Takes a share lock on the item row and re-checks that it is active, so a
    /// claim cannot slip in behind a concurrent approval. A duplicate
    /// (item, claimant) pair fails with a unique violation on
    /// [`ITEM_CLAIMANT_CONSTRAINT`].
    pub async fn create(
        pool: &PgPool,
        item_id: Uuid,
        claimant_id: Uuid,
        message: &str,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status: Option<ItemStatus> =
            sqlx::query_scalar("SELECT status FROM items WHERE id = $1 FOR SHARE")
                .bind(item_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => return Ok(SubmitOutcome::ItemNotFound),
            Some(status) if !status.accepts_claims() => {
                return Ok(SubmitOutcome::ItemNotActive(status))
            }
            Some(_) => {}
        }

        let claim = sqlx::query_as::<_, ClaimRequest>(&format!(
            r#"
            INSERT INTO claim_requests (item_id, claimant_id, message)
            VALUES ($1, $2, $3)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(item_id)
        .bind(claimant_id)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubmitOutcome::Created(claim))
    }

    /// Finds a claim by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let claim = sqlx::query_as::<_, ClaimRequest>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claim_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(claim)
    }

    /// Finds the claim a user submitted on an item, if any
    pub async fn find_by_item_and_claimant(
        pool: &PgPool,
        item_id: Uuid,
        claimant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let claim = sqlx::query_as::<_, ClaimRequest>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claim_requests WHERE item_id = $1 AND claimant_id = $2"
        ))
        .bind(item_id)
        .bind(claimant_id)
        .fetch_optional(pool)
        .await?;

        Ok(claim)
    }

    /// Lists all claims on an item, newest first
    pub async fn list_by_item(pool: &PgPool, item_id: Uuid) -> Result<Vec<ClaimDetail>, sqlx::Error> {
        let claims = sqlx::query_as::<_, ClaimDetail>(
            r#"
            SELECT c.id, c.item_id, c.claimant_id, c.message, c.status, c.created_at,
                   i.title AS item_title, u.username AS claimant_username
            FROM claim_requests c
            JOIN items i ON i.id = c.item_id
            JOIN users u ON u.id = c.claimant_id
            WHERE c.item_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(pool)
        .await?;

        Ok(claims)
    }

    /// Lists all claims submitted by a user, newest first
    pub async fn list_by_claimant(
        pool: &PgPool,
        claimant_id: Uuid,
    ) -> Result<Vec<ClaimDetail>, sqlx::Error> {
        let claims = sqlx::query_as::<_, ClaimDetail>(
            r#"
            SELECT c.id, c.item_id, c.claimant_id, c.message, c.status, c.created_at,
                   i.title AS item_title, u.username AS claimant_username
            FROM claim_requests c
            JOIN items i ON i.id = c.item_id
            JOIN users u ON u.id = c.claimant_id
            WHERE c.claimant_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(claimant_id)
        .fetch_all(pool)
        .await?;

        Ok(claims)
    }

    /// Counts pending claims on an item
    pub async fn count_pending_for_item(pool: &PgPool, item_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM claim_requests WHERE item_id = $1 AND status = 'pending'",
        )
        .bind(item_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Approves a claim
    ///
    /// Runs as one transaction holding the item row lock:
    /// 1. Mark the claim approved
    /// 2. Mark the item claimed
    /// 3. Reject every other pending claim on the item
    ///
    /// Concurrent approvals on the same item serialize on the item lock; the
    /// loser observes the item as no longer active. Any error drops the
    /// transaction uncommitted, rolling back all three updates.
    pub async fn approve(pool: &PgPool, id: Uuid) -> Result<ApprovalOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let item_id: Option<Uuid> =
            sqlx::query_scalar("SELECT item_id FROM claim_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(item_id) = item_id else {
            return Ok(ApprovalOutcome::NotFound);
        };

        // Lock order: item first, then claim
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, owner_id, title, description, category, item_type, location,
                   date_reported, image, status, created_at, updated_at
            FROM items
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(item) = item else {
            return Ok(ApprovalOutcome::NotFound);
        };

        let claim = sqlx::query_as::<_, ClaimRequest>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claim_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(claim) = claim else {
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

        let claim = sqlx::query_as::<_, ClaimRequest>(&format!(
            r#"
            UPDATE claim_requests
            SET status = 'approved'
            WHERE id = $1
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET status = 'claimed',
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, owner_id, title, description, category, item_type, location,
                      date_reported, image, status, created_at, updated_at
            "#,
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let rejected = sqlx::query(
            r#"
            UPDATE claim_requests
            SET status = 'rejected'
            WHERE item_id = $1 AND status = 'pending' AND id <> $2
            "#,
        )
        .bind(item_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ApprovalOutcome::Approved {
            claim,
            item,
            rejected_siblings: rejected.rows_affected(),
        })
    }

    /// Rejects a pending claim
    ///
    /// Does not touch the item.
    pub async fn reject(pool: &PgPool, id: Uuid) -> Result<RejectionOutcome, sqlx::Error> {
        let rejected = sqlx::query_as::<_, ClaimRequest>(&format!(
            r#"
            UPDATE claim_requests
            SET status = 'rejected'
            WHERE id = $1 AND status = 'pending'
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        if let Some(claim) = rejected {
            return Ok(RejectionOutcome::Rejected(claim));
        }

        let outcome = match Self::find_by_id(pool, id).await? {
            None => RejectionOutcome::NotFound,
            Some(claim) if claim.status == ClaimStatus::Approved => {
                RejectionOutcome::ClaimApproved(claim)
            }
            Some(claim) => RejectionOutcome::AlreadyRejected(claim),
        };

        Ok(outcome)
    }
}
