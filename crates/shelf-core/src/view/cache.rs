use super::card::RenderedItem;
use crate::ItemId;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub builds: u64,
    pub clears: u64,
}

/// Identity-keyed store of built cards.
///
/// Entries are only created when the renderer places an item, never ahead of
/// time. Placed nodes share the `Rc` with the cache, so a cached card and the
/// one on screen are the same allocation until a patch splits them.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<ItemId, Rc<RenderedItem>>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Rc<RenderedItem>> {
        self.entries.get(id).cloned()
    }

    pub fn put(&mut self, id: ItemId, node: Rc<RenderedItem>) {
        self.entries.insert(id, node);
    }

    /// Cached card for `id`, building and storing it on a miss.
    pub fn get_or_build(
        &mut self,
        id: &str,
        build: impl FnOnce() -> RenderedItem,
    ) -> Rc<RenderedItem> {
        if let Some(node) = self.entries.get(id) {
            self.stats.hits += 1;
            return Rc::clone(node);
        }
        self.stats.builds += 1;
        let node = Rc::new(build());
        self.put(id.to_string(), Rc::clone(&node));
        node
    }

    /// Drops one entry; returns whether it was present.
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::trace!(entries = self.entries.len(), "render cache cleared");
        }
        self.entries.clear();
        self.stats.clears += 1;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
