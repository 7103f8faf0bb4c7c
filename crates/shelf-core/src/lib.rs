//! shelf-core: saved-post model, storage traits, and the list view engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub mod error;
#[cfg(feature = "file-store")]
pub mod file_store;
pub mod view;
pub mod xfer;

pub use error::{Error, Result};
#[cfg(feature = "file-store")]
pub use file_store::FileStore;

pub type ItemId = String;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unread,
    Archived,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unread => "unread",
            Status::Archived => "archived",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Unread => Status::Archived,
            Status::Archived => Status::Unread,
        }
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unread" => Ok(Status::Unread),
            "archived" => Ok(Status::Archived),
            other => Err(Error::Validation(format!("unknown status '{other}'"))),
        }
    }
}

/// A saved post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(alias = "tweetId")]
    pub id: ItemId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub status: Status,
}

impl Item {
    pub fn new<S: Into<String>>(id: ItemId, url: S, author: S, text: S) -> Self {
        Self {
            id,
            url: url.into(),
            author: author.into(),
            text: text.into(),
            saved_at: Utc::now(),
            tags: Vec::new(),
            note: String::new(),
            status: Status::Unread,
        }
    }
}

/// A discovery event from a scraped page: enough to save a new item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capture {
    pub id: ItemId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
}

impl Capture {
    pub fn into_item(self, now: DateTime<Utc>) -> Item {
        Item {
            id: self.id,
            url: self.url,
            author: self.author,
            text: self.text,
            saved_at: now,
            tags: Vec::new(),
            note: String::new(),
            status: Status::Unread,
        }
    }
}

/// Loosely-typed item as found in backups and mirror files.
///
/// Every field is optional; [`RawItem::normalize`] fills defaults and rejects
/// entries without a usable string id. `id` wins over the legacy `tweetId`
/// when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: Option<Value>,
    pub tweet_id: Option<Value>,
    pub url: Option<Value>,
    pub author: Option<Value>,
    pub text: Option<Value>,
    pub saved_at: Option<Value>,
    pub tags: Option<Value>,
    pub note: Option<Value>,
    pub status: Option<Value>,
}

impl RawItem {
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::Validation("item is not an object".into()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn normalize(self, now: DateTime<Utc>) -> Result<Item> {
        let id = [self.id, self.tweet_id]
            .into_iter()
            .find_map(|v| match v {
                Some(Value::String(s)) if !s.is_empty() => Some(s),
                _ => None,
            });
        let Some(id) = id else {
            return Err(Error::Validation("item lacks a string id".into()));
        };
        let saved_at = match self.saved_at {
            None | Some(Value::Null) => now,
            Some(Value::String(s)) if s.is_empty() => now,
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map_err(|e| Error::Validation(format!("item {id}: bad savedAt '{s}': {e}")))?
                .with_timezone(&Utc),
            Some(other) => {
                return Err(Error::Validation(format!(
                    "item {id}: savedAt must be a timestamp string, got {other}"
                )))
            }
        };
        let tags = match self.tags {
            Some(Value::Array(values)) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let status = match self.status {
            Some(Value::String(s)) if s == "archived" => Status::Archived,
            _ => Status::Unread,
        };
        Ok(Item {
            id,
            url: string_or_empty(self.url),
            author: string_or_empty(self.author),
            text: string_or_empty(self.text),
            saved_at,
            tags,
            note: string_or_empty(self.note),
            status,
        })
    }
}

fn string_or_empty(v: Option<Value>) -> String {
    match v {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Editable fields of an item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldUpdate {
    pub tags: Option<Vec<String>>,
    pub note: Option<String>,
    pub status: Option<Status>,
}

impl FieldUpdate {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.note.is_none() && self.status.is_none()
    }

    pub fn is_status_only(&self) -> bool {
        self.status.is_some() && self.tags.is_none() && self.note.is_none()
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        if let Some(note) = &self.note {
            item.note = note.clone();
        }
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Item),
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Item),
    NotFound,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Persistence collaborator. Expected misses are outcome values, not errors.
pub trait Store: Send + Sync {
    fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }
    fn list_all(&self) -> anyhow::Result<Vec<Item>>;
    fn save(&self, capture: Capture) -> anyhow::Result<SaveOutcome>;
    fn remove(&self, id: &str) -> anyhow::Result<RemoveOutcome>;
    fn update_fields(&self, id: &str, update: &FieldUpdate) -> anyhow::Result<UpdateOutcome>;
    fn exists(&self, id: &str) -> anyhow::Result<bool>;
    fn import_batch(&self, items: Vec<Item>) -> anyhow::Result<ImportSummary>;
    fn unread_count(&self) -> anyhow::Result<usize> {
        Ok(self
            .list_all()?
            .iter()
            .filter(|i| i.status == Status::Unread)
            .count())
    }
}

/// In-memory store, used by tests and as the scratch backend for the CLI.
#[derive(Default)]
pub struct MemStore {
    inner: RwLock<Vec<Item>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            inner: RwLock::new(items),
        }
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Vec<Item>>> {
        self.inner
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Vec<Item>>> {
        self.inner
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))
    }
}

impl Store for MemStore {
    fn list_all(&self) -> anyhow::Result<Vec<Item>> {
        Ok(self.read()?.clone())
    }

    fn save(&self, capture: Capture) -> anyhow::Result<SaveOutcome> {
        let mut v = self.write()?;
        Ok(save_into(&mut v, capture, Utc::now()))
    }

    fn remove(&self, id: &str) -> anyhow::Result<RemoveOutcome> {
        let mut v = self.write()?;
        Ok(remove_from(&mut v, id))
    }

    fn update_fields(&self, id: &str, update: &FieldUpdate) -> anyhow::Result<UpdateOutcome> {
        let mut v = self.write()?;
        Ok(update_in(&mut v, id, update))
    }

    fn exists(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.read()?.iter().any(|i| i.id == id))
    }

    fn import_batch(&self, items: Vec<Item>) -> anyhow::Result<ImportSummary> {
        let mut v = self.write()?;
        Ok(import_into(&mut v, items))
    }
}

// Collection operations shared by the backends. Each works on the whole
// persisted list, the way a single-key key-value store does.

pub(crate) fn save_into(items: &mut Vec<Item>, capture: Capture, now: DateTime<Utc>) -> SaveOutcome {
    if items.iter().any(|i| i.id == capture.id) {
        return SaveOutcome::Duplicate;
    }
    let item = capture.into_item(now);
    items.insert(0, item.clone());
    SaveOutcome::Saved(item)
}

pub(crate) fn remove_from(items: &mut Vec<Item>, id: &str) -> RemoveOutcome {
    match items.iter().position(|i| i.id == id) {
        Some(idx) => {
            items.remove(idx);
            RemoveOutcome::Removed
        }
        None => RemoveOutcome::NotFound,
    }
}

pub(crate) fn update_in(items: &mut [Item], id: &str, update: &FieldUpdate) -> UpdateOutcome {
    match items.iter_mut().find(|i| i.id == id) {
        Some(item) => {
            update.apply_to(item);
            UpdateOutcome::Updated(item.clone())
        }
        None => UpdateOutcome::NotFound,
    }
}

pub(crate) fn import_into(items: &mut Vec<Item>, batch: Vec<Item>) -> ImportSummary {
    let mut summary = ImportSummary::default();
    for item in batch {
        if items.iter().any(|i| i.id == item.id) {
            summary.skipped += 1;
            continue;
        }
        items.push(item);
        summary.imported += 1;
    }
    items.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
    tracing::info!(
        imported = summary.imported,
        skipped = summary.skipped,
        "import batch merged"
    );
    summary
}
