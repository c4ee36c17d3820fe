//! Item mutations that also write the action log.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ActionCounts, ActionKind, ActionLogEntry, Item, NewItem, SparkScore};
use crate::storage::{ActionLogStore, ItemStore};

pub async fn add_item<S>(items: &S, owner_id: Uuid, new_item: NewItem) -> Result<Item, AppError>
where
    S: ItemStore + ?Sized,
{
    let item = items.add_item(new_item.into_item(owner_id)).await?;
    tracing::info!(item_id = %item.id, owner_id = %owner_id, name = %item.name, "added item");
    Ok(item)
}

pub async fn find_owned<S>(items: &S, owner_id: Uuid, item_id: Uuid) -> Result<Item, AppError>
where
    S: ItemStore + ?Sized,
{
    items
        .find_item(owner_id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))
}

/// Sets the score and appends a `rate` entry. When the log write fails the
/// previous score is put back, so a rating never exists without its entry.
pub async fn rate_item<S, L>(
    items: &S,
    log: &L,
    owner_id: Uuid,
    item_id: Uuid,
    score: SparkScore,
    mood: String,
) -> Result<Item, AppError>
where
    S: ItemStore + ?Sized,
    L: ActionLogStore + ?Sized,
{
    let previous = find_owned(items, owner_id, item_id).await?.score;
    let item = items
        .set_score(owner_id, item_id, Some(score))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))?;

    let entry = ActionLogEntry::new(owner_id, ActionKind::Rate, item.name.clone(), mood);
    if let Err(err) = log.append(entry).await {
        tracing::warn!(item_id = %item.id, "action log write failed, restoring previous score");
        items.set_score(owner_id, item_id, previous).await?;
        return Err(err.into());
    }

    tracing::info!(item_id = %item.id, score = score.value(), "rated item");
    Ok(item)
}

/// Appends a `delete` entry, then removes the item for good.
pub async fn dispose_item<S, L>(
    items: &S,
    log: &L,
    owner_id: Uuid,
    item_id: Uuid,
    mood: String,
) -> Result<Item, AppError>
where
    S: ItemStore + ?Sized,
    L: ActionLogStore + ?Sized,
{
    let item = find_owned(items, owner_id, item_id).await?;

    log.append(ActionLogEntry::new(owner_id, ActionKind::Delete, item.name.clone(), mood))
        .await?;

    let removed = items
        .remove_item(owner_id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))?;

    tracing::info!(item_id = %removed.id, name = %removed.name, "disposed of item");
    Ok(removed)
}

pub struct History {
    pub entries: Vec<ActionLogEntry>,
    pub counts: ActionCounts,
}

pub async fn history<L>(log: &L, owner_id: Uuid) -> Result<History, AppError>
where
    L: ActionLogStore + ?Sized,
{
    let entries = log.entries_for_owner(owner_id).await?;
    let counts = ActionCounts::tally(&entries);
    Ok(History { entries, counts })
}
