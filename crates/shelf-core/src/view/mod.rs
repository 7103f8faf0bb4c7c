//! List view engine.
//!
//! Turns the saved collection into what a list container shows:
//!
//! 1. [`criteria::apply`] filters and sorts the collection into an ordered
//!    view (positions into the collection). Every pass clears the render
//!    cache.
//! 2. If the ordered view is longer than the virtualization threshold,
//!    [`window::compute_window`] maps the host's scroll offset and viewport
//!    height to the `[start, end)` slice that gets materialized; shorter views
//!    are rendered in full.
//! 3. Cards come from the [`cache::RenderCache`] when present and are built
//!    (with all user text escaped) on a miss.
//! 4. A status toggle on an on-screen card goes through [`patch`] instead of
//!    a full pass, retiring only that card's cache entry.
//!
//! [`engine::ViewEngine`] owns all of this state for one list.

pub mod cache;
pub mod card;
pub mod collection;
pub mod criteria;
pub mod engine;
pub mod frame;
pub mod patch;
pub mod timer;
pub mod window;

pub use cache::RenderCache;
pub use card::{escape_html, ActionButton, ActionKind, RenderedItem, StatusBadge, ViewFlavor};
pub use collection::ItemStore;
pub use criteria::{SortOrder, StatusFilter, TagFilter, ViewCriteria};
pub use engine::{Refresh, Stats, ViewConfig, ViewEngine};
pub use frame::{Frame, Layout, Placed};
pub use window::{compute_window, Viewport, Window};
