use super::cache::RenderCache;
use super::card::{RenderedItem, ViewFlavor};
use super::collection::ItemStore;
use super::criteria::{self, TagFilter, ViewCriteria};
use super::frame::{Frame, Layout, Placed};
use super::patch;
use super::timer::{Debouncer, Throttle};
use super::window::{compute_window, row_top, track_height, Viewport, Window};
use crate::{Error, FieldUpdate, Item, Result, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_VIRTUALIZATION_THRESHOLD: usize = 50;
pub const DEFAULT_ITEM_HEIGHT: u32 = 180;
pub const DEFAULT_BUFFER_SIZE: usize = 5;

/// Options recognized when building a [`ViewEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub mode: ViewFlavor,
    /// Ordered views longer than this are windowed.
    pub virtualization_threshold: usize,
    /// Fixed row height in pixels.
    pub item_height: u32,
    /// Extra rows materialized above and below the viewport.
    pub buffer_size: usize,
    pub search_debounce_ms: u64,
    pub scroll_throttle_ms: u64,
    pub notification_ms: u64,
    pub empty_placeholder: String,
    pub error_placeholder: String,
    pub no_results_placeholder: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            mode: ViewFlavor::Interactive,
            virtualization_threshold: DEFAULT_VIRTUALIZATION_THRESHOLD,
            item_height: DEFAULT_ITEM_HEIGHT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            search_debounce_ms: 200,
            scroll_throttle_ms: 16,
            notification_ms: 3000,
            empty_placeholder: "No saved posts yet".into(),
            error_placeholder: "Failed to load posts".into(),
            no_results_placeholder: "No posts match your filters".into(),
        }
    }
}

impl ViewConfig {
    pub fn validate(&self) -> Result<()> {
        if self.item_height == 0 {
            return Err(Error::Validation("item_height must be greater than zero".into()));
        }
        Ok(())
    }
}

/// How a single-item update reached the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Patched,
    Rerendered,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub unread: usize,
    pub archived: usize,
    pub showing: usize,
}

/// Filtered, sorted, windowed view over a collection of saved items.
///
/// One instance per on-screen list. All state is owned here and mutated from
/// the host's event loop; the type is deliberately `!Send`.
#[derive(Debug)]
pub struct ViewEngine {
    config: ViewConfig,
    store: ItemStore,
    criteria: ViewCriteria,
    // positions into `store`, in display order
    ordered: Vec<usize>,
    viewport: Viewport,
    window: Option<Window>,
    cache: RenderCache,
    frame: Frame,
    // set by every filter pass; the frame no longer matches `ordered`
    frame_stale: bool,
    search: Debouncer<String>,
    scroll: Throttle,
    toast: Option<(String, Instant)>,
    render_count: u64,
}

impl ViewEngine {
    pub fn new(config: ViewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search: Debouncer::new(Duration::from_millis(config.search_debounce_ms)),
            scroll: Throttle::new(Duration::from_millis(config.scroll_throttle_ms)),
            config,
            store: ItemStore::new(),
            criteria: ViewCriteria::default(),
            ordered: Vec::new(),
            viewport: Viewport::default(),
            window: None,
            cache: RenderCache::new(),
            frame: Frame::Blank,
            frame_stale: false,
            toast: None,
            render_count: 0,
        })
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn flavor(&self) -> ViewFlavor {
        self.config.mode
    }

    // ---- collection ----

    /// Replaces the collection wholesale and re-runs the current filter.
    pub fn set_all(&mut self, items: Vec<Item>) {
        let dropped = self.store.set_all(items);
        tracing::debug!(items = self.store.len(), dropped, "collection replaced");
        self.cache.clear();
        self.reconcile_tag_filter();
        self.refilter();
    }

    pub fn get_all(&self) -> &[Item] {
        self.store.get_all()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.store.get(id)
    }

    /// Adds a newly saved item.
    pub fn insert(&mut self, item: Item) -> Result<()> {
        self.store.append(item)?;
        self.refilter();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Item> {
        let item = self
            .store
            .remove(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        self.cache.invalidate(id);
        self.reconcile_tag_filter();
        self.refilter();
        Ok(item)
    }

    /// Applies an edit to the collection and brings the screen up to date.
    ///
    /// A status-only change that leaves the item's membership in the view
    /// unchanged is patched in place; anything else re-filters and
    /// re-renders.
    pub fn update_item(&mut self, id: &str, changes: &FieldUpdate) -> Result<Refresh> {
        let was_in_view = self
            .store
            .get(id)
            .map(|it| criteria::matches(it, &self.criteria))
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let still_in_view = self
            .store
            .update(id, changes)
            .map(|it| criteria::matches(it, &self.criteria))
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if changes.tags.is_some() {
            self.reconcile_tag_filter();
        }
        if was_in_view == still_in_view && self.patch(id, changes) {
            return Ok(Refresh::Patched);
        }
        self.refilter();
        self.render()?;
        Ok(Refresh::Rerendered)
    }

    pub fn available_tags(&self) -> Vec<String> {
        criteria::available_tags(self.store.get_all())
    }

    // A tag filter whose tag no longer exists falls back to "all".
    fn reconcile_tag_filter(&mut self) {
        if let TagFilter::Tag(tag) = &self.criteria.tag {
            if !self.store.get_all().iter().any(|i| i.tags.contains(tag)) {
                tracing::debug!(%tag, "active tag filter vanished; resetting to all");
                self.criteria.tag = TagFilter::All;
            }
        }
    }

    // ---- filter / sort ----

    pub fn criteria(&self) -> &ViewCriteria {
        &self.criteria
    }

    pub fn apply_criteria(&mut self, criteria: ViewCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.ordered = criteria::apply(self.store.get_all(), &self.criteria);
        self.cache.clear();
        self.window = None;
        self.frame_stale = true;
        tracing::debug!(
            matched = self.ordered.len(),
            total = self.store.len(),
            "criteria applied"
        );
    }

    pub fn filtered_view(&self) -> impl ExactSizeIterator<Item = &Item> + '_ {
        let items = self.store.get_all();
        self.ordered.iter().map(move |&i| &items[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.ordered.len()
    }

    // ---- windowing ----

    pub fn is_virtualized(&self) -> bool {
        self.ordered.len() > self.config.virtualization_threshold
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Window of the last virtual render, if the view is windowed.
    pub fn window(&self) -> Option<Window> {
        self.window
    }

    fn compute_window(&self) -> Window {
        compute_window(
            self.ordered.len(),
            self.config.item_height,
            self.config.buffer_size,
            self.viewport.scroll_offset,
            self.viewport.height,
        )
    }

    // ---- rendering ----

    /// Materializes the current view into [`Self::frame`].
    pub fn render(&mut self) -> Result<&Frame> {
        self.frame = self.materialize()?;
        self.frame_stale = false;
        self.render_count += 1;
        Ok(&self.frame)
    }

    fn materialize(&mut self) -> Result<Frame> {
        if self.store.is_empty() {
            self.window = None;
            return Ok(Frame::Empty {
                placeholder: self.config.empty_placeholder.clone(),
            });
        }
        if self.ordered.is_empty() {
            self.window = None;
            return Ok(Frame::NoMatch {
                placeholder: self.config.no_results_placeholder.clone(),
            });
        }
        if !self.is_virtualized() {
            self.window = None;
            let items = (0..self.ordered.len())
                .map(|i| self.place(i, None))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Frame::Populated {
                layout: Layout::Flow,
                items,
            });
        }
        let window = self.compute_window();
        let h = self.config.item_height;
        let items = window
            .range()
            .map(|i| self.place(i, Some(row_top(i, h))))
            .collect::<Result<Vec<_>>>()?;
        self.window = Some(window);
        tracing::trace!(start = window.start, end = window.end, "window rendered");
        Ok(Frame::Populated {
            layout: Layout::Absolute {
                track_height: track_height(self.ordered.len(), h),
                window,
            },
            items,
        })
    }

    fn place(&mut self, index: usize, top: Option<u64>) -> Result<Placed> {
        let len = self.ordered.len();
        let pos = *self
            .ordered
            .get(index)
            .ok_or(Error::RenderFault { index, len })?;
        let item = &self.store.get_all()[pos];
        let flavor = self.config.mode;
        let node = self
            .cache
            .get_or_build(&item.id, || RenderedItem::build(item, flavor));
        Ok(Placed { index, top, node })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Whether the frame reflects the current ordered view. Any mutation or
    /// filter pass makes it stale until the next [`Self::render`].
    pub fn frame_is_current(&self) -> bool {
        !self.frame_stale
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Number of materializations so far.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn show_load_error(&mut self, message: &str) {
        let message = if message.trim().is_empty() {
            self.config.error_placeholder.clone()
        } else {
            message.to_string()
        };
        tracing::warn!(%message, "showing load error");
        self.window = None;
        self.frame = Frame::Error { message };
        self.frame_stale = false;
    }

    // ---- patching ----

    /// In-place status patch of an on-screen card. `false` means the caller
    /// must re-filter and re-render. A stale frame is never patched.
    pub fn patch(&mut self, id: &str, changes: &FieldUpdate) -> bool {
        let applied =
            !self.frame_stale && patch::patch(&mut self.frame, &mut self.cache, id, changes);
        if !applied {
            tracing::debug!(%id, "patch not applicable; full render needed");
        }
        applied
    }

    // ---- host events ----

    /// Records a keystroke in the search box; the filter runs once input has
    /// been quiet for the debounce delay (see [`Self::poll`]).
    pub fn on_search_input(&mut self, term: impl Into<String>, now: Instant) {
        self.search.schedule(term.into(), now);
    }

    /// Fires an elapsed search debounce. Returns whether a re-render happened.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        if matches!(&self.toast, Some((_, until)) if *until <= now) {
            self.toast = None;
        }
        let Some(term) = self.search.fire(now) else {
            return Ok(false);
        };
        self.criteria.search_term = term;
        self.refilter();
        self.render()?;
        Ok(true)
    }

    /// Earliest instant at which [`Self::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Handles a scroll event. Events inside the throttle interval are
    /// dropped; a position that maps to the current window renders nothing.
    pub fn on_scroll(&mut self, scroll_offset: u32, viewport_height: u32, now: Instant) -> Result<bool> {
        if !self.scroll.admit(now) {
            return Ok(false);
        }
        self.viewport = Viewport::new(scroll_offset, viewport_height);
        if !self.is_virtualized() {
            return Ok(false);
        }
        let next = self.compute_window();
        if !self.frame_stale && self.frame.is_virtual() && self.window == Some(next) {
            return Ok(false);
        }
        tracing::trace!(start = next.start, end = next.end, "window moved");
        self.render()?;
        Ok(true)
    }

    // ---- status line ----

    pub fn stats(&self) -> Stats {
        let items = self.store.get_all();
        let unread = items.iter().filter(|i| i.status == Status::Unread).count();
        Stats {
            total: items.len(),
            unread,
            archived: items.len() - unread,
            showing: self.ordered.len(),
        }
    }

    pub fn showing_label(&self) -> String {
        match self.ordered.len() {
            1 => "Showing 1 post".to_string(),
            n => format!("Showing {n} posts"),
        }
    }

    /// Most recent save time across the collection.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.store.get_all().iter().map(|i| i.saved_at).max()
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Instant) {
        let until = now + Duration::from_millis(self.config.notification_ms);
        self.toast = Some((message.into(), until));
    }

    pub fn notification(&self, now: Instant) -> Option<&str> {
        match &self.toast {
            Some((msg, until)) if now < *until => Some(msg.as_str()),
            _ => None,
        }
    }
}
