/// Item lifecycle operations
///
/// Only the owner may edit, close or delete an item. Status changes to
/// `claimed` happen exclusively through [`super::claims::approve`].

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::{validate, LifecycleError, LifecycleResult},
    models::item::{Item, ItemFields, ItemStatus},
    store::Store,
};

/// Creates a new active item owned by `owner_id`
pub async fn create(store: &dyn Store, owner_id: Uuid, fields: ItemFields) -> LifecycleResult<Item> {
    let fields = fields.normalized();
    validate(&fields)?;

    let item = store.insert_item(owner_id, fields).await?;

    info!(
        item_id = %item.id,
        owner_id = %owner_id,
        item_type = %item.item_type,
        category = %item.category,
        "Item reported"
    );

    Ok(item)
}

/// Loads an item and checks that `requester` owns it
pub async fn find_owned(store: &dyn Store, item_id: Uuid, requester: Uuid) -> LifecycleResult<Item> {
    let item = store
        .find_item(item_id)
        .await?
        .ok_or(LifecycleError::NotFound("Item"))?;

    if item.owner_id != requester {
        debug!(item_id = %item_id, requester = %requester, "Rejected non-owner item access");
        return Err(LifecycleError::Authorization(
            "Only the owner can manage this item".to_string(),
        ));
    }

    Ok(item)
}

/// Replaces the editable fields of an item
///
/// Allowed in any status; the status itself never changes here.
pub async fn edit(
    store: &dyn Store,
    item_id: Uuid,
    requester: Uuid,
    fields: ItemFields,
) -> LifecycleResult<Item> {
    find_owned(store, item_id, requester).await?;

    let fields = fields.normalized();
    validate(&fields)?;

    let item = store
        .update_item_fields(item_id, fields)
        .await?
        .ok_or(LifecycleError::NotFound("Item"))?;

    info!(item_id = %item.id, "Item updated");
    Ok(item)
}

/// Closes an active item
///
/// Closing an already closed item is a no-op. A claimed item cannot be closed.
/// Pending claims stay pending but can no longer be approved.
pub async fn close(store: &dyn Store, item_id: Uuid, requester: Uuid) -> LifecycleResult<Item> {
    let item = find_owned(store, item_id, requester).await?;

    if item.status == ItemStatus::Closed {
        debug!(item_id = %item_id, "Item already closed");
        return Ok(item);
    }
    if !item.status.can_transition_to(ItemStatus::Closed) {
        return Err(LifecycleError::InactiveItem(item.status));
    }

    match store.close_item(item_id).await? {
        Some(closed) => {
            info!(item_id = %item_id, "Item closed by owner");
            Ok(closed)
        }
        None => {
            // Lost a race: re-read to report the state that won
            let current = store
                .find_item(item_id)
                .await?
                .ok_or(LifecycleError::NotFound("Item"))?;

            match current.status {
                ItemStatus::Closed => Ok(current),
                status => Err(LifecycleError::InactiveItem(status)),
            }
        }
    }
}

/// Deletes an item together with all of its claims
pub async fn delete(store: &dyn Store, item_id: Uuid, requester: Uuid) -> LifecycleResult<()> {
    find_owned(store, item_id, requester).await?;

    if !store.delete_item(item_id).await? {
        return Err(LifecycleError::NotFound("Item"));
    }

    info!(item_id = %item_id, "Item deleted with its claims");
    Ok(())
}
