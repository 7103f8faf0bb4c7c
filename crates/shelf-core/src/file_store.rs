//! JSON-file backend: the whole collection lives under a single key, the way
//! a browser extension's local key-value storage holds it.

use crate::{
    import_into, remove_from, save_into, update_in, Capture, FieldUpdate, ImportSummary, Item,
    RemoveOutcome, SaveOutcome, Store, UpdateOutcome,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    tweets: Vec<Item>,
}

pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };
        store.init()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<Vec<Item>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let s = fs::read_to_string(&self.path)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: Document = serde_json::from_str(&s)
            .map_err(|e| anyhow::anyhow!("corrupt store {}: {}", self.path.display(), e))?;
        Ok(doc.tweets)
    }

    fn persist(&self, items: Vec<Item>) -> anyhow::Result<()> {
        let doc = Document { tweets: items };
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&doc)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Item>) -> T) -> anyhow::Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let mut items = self.load()?;
        let out = f(&mut items);
        self.persist(items)?;
        Ok(out)
    }
}

impl Store for FileStore {
    fn init(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        if !self.path.exists() {
            self.persist(Vec::new())?;
            tracing::debug!(path = %self.path.display(), "created empty store");
        }
        Ok(())
    }

    fn list_all(&self) -> anyhow::Result<Vec<Item>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        self.load()
    }

    fn save(&self, capture: Capture) -> anyhow::Result<SaveOutcome> {
        self.modify(|items| save_into(items, capture, Utc::now()))
    }

    fn remove(&self, id: &str) -> anyhow::Result<RemoveOutcome> {
        self.modify(|items| remove_from(items, id))
    }

    fn update_fields(&self, id: &str, update: &FieldUpdate) -> anyhow::Result<UpdateOutcome> {
        self.modify(|items| update_in(items, id, update))
    }

    fn exists(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.list_all()?.iter().any(|i| i.id == id))
    }

    fn import_batch(&self, items: Vec<Item>) -> anyhow::Result<ImportSummary> {
        self.modify(|existing| import_into(existing, items))
    }
}
