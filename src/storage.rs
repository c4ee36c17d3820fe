//! File-backed stores for items and the action log.

use crate::models::{ActionLogEntry, Item, SparkScore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

const ITEMS_FILE: &str = "items.json";
const ACTION_LOG_FILE: &str = "action_log.json";

/// Per-owner item collection. Every query takes the owner id; an item
/// belonging to someone else behaves exactly like a missing one.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn add_item(&self, item: Item) -> Result<Item>;

    /// Items in insertion order.
    async fn items_for_owner(&self, owner_id: Uuid) -> Result<Vec<Item>>;

    async fn find_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<Option<Item>>;

    /// `None` clears the score.
    async fn set_score(&self, owner_id: Uuid, item_id: Uuid, score: Option<SparkScore>) -> Result<Option<Item>>;

    async fn remove_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<Option<Item>>;
}

/// Append-only record of rate/delete events.
#[async_trait]
pub trait ActionLogStore: Send + Sync {
    async fn append(&self, entry: ActionLogEntry) -> Result<ActionLogEntry>;

    /// Entries newest-first.
    async fn entries_for_owner(&self, owner_id: Uuid) -> Result<Vec<ActionLogEntry>>;
}

/// A JSON array on disk, or nothing at all for in-memory stores.
#[derive(Debug, Clone)]
pub(crate) struct JsonFile {
    path: Option<PathBuf>,
}

impl JsonFile {
    pub(crate) fn in_dir(dir: &Path, name: &str) -> Self {
        Self {
            path: Some(dir.join(name)),
        }
    }

    pub(crate) fn memory() -> Self {
        Self { path: None }
    }

    pub(crate) fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub(crate) fn save<T: Serialize>(&self, records: &[T]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(records)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))
}

pub struct Storage {
    items: RwLock<Vec<Item>>,
    log: RwLock<Vec<ActionLogEntry>>,
    items_file: JsonFile,
    log_file: JsonFile,
}

impl Storage {
    pub fn open(data_dir: &Path) -> Result<Self> {
        ensure_dir(data_dir)?;
        Self::with_files(
            JsonFile::in_dir(data_dir, ITEMS_FILE),
            JsonFile::in_dir(data_dir, ACTION_LOG_FILE),
        )
    }

    pub fn in_memory() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            log: RwLock::new(Vec::new()),
            items_file: JsonFile::memory(),
            log_file: JsonFile::memory(),
        }
    }

    fn with_files(items_file: JsonFile, log_file: JsonFile) -> Result<Self> {
        let items = items_file.load().context("Failed to load items")?;
        let log = log_file.load().context("Failed to load action log")?;

        Ok(Self {
            items: RwLock::new(items),
            log: RwLock::new(log),
            items_file,
            log_file,
        })
    }
}

#[async_trait]
impl ItemStore for Storage {
    async fn add_item(&self, item: Item) -> Result<Item> {
        let mut items = self.items.write().await;
        items.push(item.clone());
        self.items_file.save(&items)?;
        Ok(item)
    }

    async fn items_for_owner(&self, owner_id: Uuid) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|i| i.owner_id == owner_id).cloned().collect())
    }

    async fn find_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .find(|i| i.id == item_id && i.owner_id == owner_id)
            .cloned())
    }

    async fn set_score(&self, owner_id: Uuid, item_id: Uuid, score: Option<SparkScore>) -> Result<Option<Item>> {
        let mut items = self.items.write().await;

        let Some(item) = items
            .iter_mut()
            .find(|i| i.id == item_id && i.owner_id == owner_id)
        else {
            return Ok(None);
        };
        item.score = score;
        let updated = item.clone();

        self.items_file.save(&items)?;
        Ok(Some(updated))
    }

    async fn remove_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<Option<Item>> {
        let mut items = self.items.write().await;

        let Some(pos) = items
            .iter()
            .position(|i| i.id == item_id && i.owner_id == owner_id)
        else {
            return Ok(None);
        };
        let removed = items.remove(pos);

        self.items_file.save(&items)?;
        Ok(Some(removed))
    }
}

#[async_trait]
impl ActionLogStore for Storage {
    async fn append(&self, entry: ActionLogEntry) -> Result<ActionLogEntry> {
        let mut log = self.log.write().await;
        log.push(entry.clone());
        self.log_file.save(&log)?;
        Ok(entry)
    }

    async fn entries_for_owner(&self, owner_id: Uuid) -> Result<Vec<ActionLogEntry>> {
        let log = self.log.read().await;
        Ok(log
            .iter()
            .rev()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
