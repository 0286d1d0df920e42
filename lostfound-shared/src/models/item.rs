/// Item model and database operations
///
/// An item is a lost or found object listing created by a user. Listings are
/// visible to everyone while they are `active`; once an item is `claimed`
/// (through an approved claim) or `closed` (by its owner) it drops out of
/// search results and stops accepting claims.
///
/// # State Machine
///
/// ```text
/// active → claimed   (claim approval only)
/// active → closed    (owner action)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     category item_category NOT NULL DEFAULT 'others',
///     item_type item_type NOT NULL,
///     location VARCHAR(200) NOT NULL,
///     date_reported DATE NOT NULL,
///     image VARCHAR(512),
///     status item_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::UnknownVariant;

/// Columns selected for every item query
const ITEM_COLUMNS: &str = "id, owner_id, title, description, category, item_type, location, \
                            date_reported, image, status, created_at, updated_at";

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Electronics,
    Documents,
    Clothing,
    Accessories,
    Keys,
    Bags,
    Others,
}

impl ItemCategory {
    /// All categories in display order
    pub const ALL: [ItemCategory; 7] = [
        ItemCategory::Electronics,
        ItemCategory::Documents,
        ItemCategory::Clothing,
        ItemCategory::Accessories,
        ItemCategory::Keys,
        ItemCategory::Bags,
        ItemCategory::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "electronics",
            ItemCategory::Documents => "documents",
            ItemCategory::Clothing => "clothing",
            ItemCategory::Accessories => "accessories",
            ItemCategory::Keys => "keys",
            ItemCategory::Bags => "bags",
            ItemCategory::Others => "others",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Documents => "Documents",
            ItemCategory::Clothing => "Clothing",
            ItemCategory::Accessories => "Accessories",
            ItemCategory::Keys => "Keys",
            ItemCategory::Bags => "Bags & Wallets",
            ItemCategory::Others => "Others",
        }
    }

    /// Emoji icon shown next to listings
    pub fn icon(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "📱",
            ItemCategory::Documents => "📄",
            ItemCategory::Clothing => "👕",
            ItemCategory::Accessories => "⌚",
            ItemCategory::Keys => "🔑",
            ItemCategory::Bags => "👜",
            ItemCategory::Others => "📦",
        }
    }
}

impl Default for ItemCategory {
    fn default() -> Self {
        ItemCategory::Others
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

/// Whether the listing reports a lost or a found object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Lost => "Lost",
            ItemType::Found => "Found",
        }
    }

    /// CSS badge class used by the front end
    pub fn badge_class(&self) -> &'static str {
        match self {
            ItemType::Lost => "badge-lost",
            ItemType::Found => "badge-found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemType::Lost),
            "found" => Ok(ItemType::Found),
            other => Err(UnknownVariant::new("item type", other)),
        }
    }
}

/// Item lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Listed and accepting claims
    Active,

    /// A claim on the item was approved
    Claimed,

    /// Closed by the owner
    Closed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Closed => "closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Active => "Active",
            ItemStatus::Claimed => "Claimed",
            ItemStatus::Closed => "Closed",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            ItemStatus::Active => "badge-active",
            ItemStatus::Claimed => "badge-claimed",
            ItemStatus::Closed => "badge-closed",
        }
    }

    /// Only active items accept new claims or approvals
    pub fn accepts_claims(&self) -> bool {
        self.can_transition_to(ItemStatus::Claimed)
    }

    /// Checks if transition to target status is valid
    pub fn can_transition_to(&self, target: ItemStatus) -> bool {
        matches!(
            (self, target),
            (ItemStatus::Active, ItemStatus::Claimed) | (ItemStatus::Active, ItemStatus::Closed)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lost or found listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Unique item ID
    pub id: Uuid,

    /// User who posted the listing
    pub owner_id: Uuid,

    pub title: String,

    pub description: String,

    pub category: ItemCategory,

    pub item_type: ItemType,

    /// Free-text location where the object was lost or found
    pub location: String,

    /// Date the object was lost or found
    pub date_reported: NaiveDate,

    /// Opaque reference to an uploaded image
    pub image: Option<String>,

    pub status: ItemStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Listing headline, e.g. `[Lost] Blue umbrella`
    pub fn display_title(&self) -> String {
        format!("[{}] {}", self.item_type.label(), self.title)
    }
}

/// Editable item fields
///
/// Used for both creation and edits. Edits replace every field; the status is
/// never part of this schema.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemFields {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub category: ItemCategory,

    pub item_type: ItemType,

    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub location: String,

    #[validate(custom(function = "validate_not_future"))]
    pub date_reported: NaiveDate,

    #[validate(length(max = 512, message = "Image reference must be at most 512 characters"))]
    pub image: Option<String>,
}

impl ItemFields {
    /// Trims surrounding whitespace from the text fields
    ///
    /// An empty image reference is treated as no image.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.location = self.location.trim().to_string();
        self.image = self
            .image
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty());
        self
    }
}

/// Rejects dates after tomorrow (UTC); one day of slack covers timezones ahead of UTC
fn validate_not_future(date: &NaiveDate) -> Result<(), ValidationError> {
    let latest = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);

    if *date > latest {
        let mut error = ValidationError::new("future_date");
        error.message = Some("Date lost/found cannot be in the future".into());
        return Err(error);
    }

    Ok(())
}

/// Search filter over active items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring matched against title, description or location
    pub query: Option<String>,

    pub category: Option<ItemCategory>,

    pub item_type: Option<ItemType>,
}

impl ItemFilter {
    /// Returns the trimmed query, or None when it is blank
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Evaluates the filter against an item, including the active-only rule
    pub fn matches(&self, item: &Item) -> bool {
        if item.status != ItemStatus::Active {
            return false;
        }
        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        if self.item_type.is_some_and(|t| t != item.item_type) {
            return false;
        }

        match self.query_text() {
            Some(q) => {
                let needle = q.to_lowercase();
                item.title.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
                    || item.location.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Aggregate counts shown on the home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemStats {
    pub total_items: i64,
    pub total_lost: i64,
    pub total_found: i64,
    pub total_claimed: i64,
}

/// Escapes LIKE wildcards so user input is matched literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Item {
    /// Creates a new item in `active` status
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        fields: ItemFields,
    ) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (owner_id, title, description, category, item_type,
                               location, date_reported, image)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.item_type)
        .bind(fields.location)
        .bind(fields.date_reported)
        .bind(fields.image)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// Finds an item by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Replaces the editable fields of an item
    ///
    /// The status column is untouched.
    pub async fn update_fields(
        pool: &PgPool,
        id: Uuid,
        fields: ItemFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET title = $2,
                description = $3,
                category = $4,
                item_type = $5,
                location = $6,
                date_reported = $7,
                image = $8,
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.category)
        .bind(fields.item_type)
        .bind(fields.location)
        .bind(fields.date_reported)
        .bind(fields.image)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Transitions an active item to closed
    ///
    /// Returns None if the item does not exist or is not active.
    pub async fn transition_to_closed(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET status = 'closed',
                updated_at = clock_timestamp()
            WHERE id = $1 AND status = 'active'
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Deletes an item together with all of its claims
    ///
    /// Claims are deleted explicitly in the same transaction as the item, so a
    /// partial delete is never visible. Locks the item row before touching any
    /// claim, the same order approval uses.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM items WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM claim_requests WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all items of an owner, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, Item>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Searches active items
    ///
    /// Returns one page of results (newest first) and the total number of matches.
    pub async fn search(
        pool: &PgPool,
        filter: &ItemFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        // Build the WHERE clause based on which filters are present
        let mut conditions = String::from("WHERE status = 'active'");
        let mut bind_count = 0;

        let pattern = filter.query_text().map(|q| format!("%{}%", escape_like(q)));

        if pattern.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0} OR location ILIKE ${0})",
                bind_count
            ));
        }
        if filter.category.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND category = ${}", bind_count));
        }
        if filter.item_type.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND item_type = ${}", bind_count));
        }

        let count_sql = format!("SELECT COUNT(*) FROM items {conditions}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = pattern.clone() {
            count_query = count_query.bind(pattern);
        }
        if let Some(category) = filter.category {
            count_query = count_query.bind(category);
        }
        if let Some(item_type) = filter.item_type {
            count_query = count_query.bind(item_type);
        }
        let total = count_query.fetch_one(pool).await?;

        let select_sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items {conditions} \
             ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        );
        let mut select_query = sqlx::query_as::<_, Item>(&select_sql);
        if let Some(pattern) = pattern {
            select_query = select_query.bind(pattern);
        }
        if let Some(category) = filter.category {
            select_query = select_query.bind(category);
        }
        if let Some(item_type) = filter.item_type {
            select_query = select_query.bind(item_type);
        }
        let items = select_query.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok((items, total))
    }

    /// Computes home page statistics over all items
    pub async fn stats(pool: &PgPool) -> Result<ItemStats, sqlx::Error> {
        let stats = sqlx::query_as::<_, ItemStats>(
            r#"
            SELECT COUNT(*) AS total_items,
                   COUNT(*) FILTER (WHERE item_type = 'lost') AS total_lost,
                   COUNT(*) FILTER (WHERE item_type = 'found') AS total_found,
                   COUNT(*) FILTER (WHERE status = 'claimed') AS total_claimed
            FROM items
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(stats)
    }
}
