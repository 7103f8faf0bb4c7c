//! Scroll geometry to visible index range.

use std::ops::Range;

/// Half-open `[start, end)` slice of the ordered view that is materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, index: usize) -> bool {
        self.range().contains(&index)
    }
}

/// Scroll position and visible height, in pixels, as reported by the host.
/// The offset is relative to the top of the list container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_offset: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(scroll_offset: u32, height: u32) -> Self {
        Self {
            scroll_offset,
            height,
        }
    }
}

/// Computes the window for a list of fixed-height rows.
///
/// `start = max(0, floor(offset / h) - buffer)` and
/// `end = min(total, start + ceil(viewport / h) + 2 * buffer)`.
/// Always `start <= end <= total`; an offset past the end yields an empty
/// window at `total`. A zero `item_height` is treated as one pixel.
pub fn compute_window(
    total_items: usize,
    item_height: u32,
    buffer_size: usize,
    scroll_offset: u32,
    viewport_height: u32,
) -> Window {
    if total_items == 0 {
        return Window::default();
    }
    let h = u64::from(item_height.max(1));
    let first_visible = usize::try_from(u64::from(scroll_offset) / h).unwrap_or(usize::MAX);
    let start = first_visible.saturating_sub(buffer_size).min(total_items);
    let on_screen = usize::try_from(u64::from(viewport_height).div_ceil(h)).unwrap_or(usize::MAX);
    let visible_count = on_screen.saturating_add(buffer_size.saturating_mul(2));
    let end = start.saturating_add(visible_count).min(total_items);
    Window { start, end }
}

/// Top edge of row `index`.
pub fn row_top(index: usize, item_height: u32) -> u64 {
    index as u64 * u64::from(item_height)
}

/// Height of the scroll track that stands in for every row.
pub fn track_height(total_items: usize, item_height: u32) -> u64 {
    total_items as u64 * u64::from(item_height)
}
