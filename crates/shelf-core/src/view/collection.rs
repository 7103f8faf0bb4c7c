use crate::{Error, FieldUpdate, Item, ItemId, Result};
use std::collections::HashMap;

/// Authoritative in-memory collection, unique by id.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection. Later duplicates of an id are dropped; the
    /// number dropped is returned.
    pub fn set_all(&mut self, items: Vec<Item>) -> usize {
        self.items.clear();
        self.positions.clear();
        let mut dropped = 0;
        for item in items {
            if self.positions.contains_key(&item.id) {
                tracing::warn!(id = %item.id, "duplicate id dropped from collection");
                dropped += 1;
                continue;
            }
            self.positions.insert(item.id.clone(), self.items.len());
            self.items.push(item);
        }
        dropped
    }

    pub fn get_all(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.positions.get(id).map(|&i| &self.items[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn append(&mut self, item: Item) -> Result<()> {
        if self.contains(&item.id) {
            return Err(Error::Validation(format!("duplicate id {}", item.id)));
        }
        self.positions.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let pos = self.positions.remove(id)?;
        let item = self.items.remove(pos);
        for it in &self.items[pos..] {
            if let Some(p) = self.positions.get_mut(&it.id) {
                *p -= 1;
            }
        }
        Some(item)
    }

    /// Applies `update` in place. The id never changes.
    pub fn update(&mut self, id: &str, update: &FieldUpdate) -> Option<&Item> {
        let pos = self.position(id)?;
        let item = &mut self.items[pos];
        update.apply_to(item);
        Some(item)
    }
}
